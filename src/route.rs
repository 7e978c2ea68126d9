/// Resource/action pair a route is gated on, attached at registration time.
/// The extension must be layered outside the gate (layers added later are
/// outermost), so the pair is already on the request when the gate reads it:
///
/// ```ignore
/// Router::new().route(
///     "/widgets",
///     get(list_widgets)
///         .layer(from_fn_with_state(authorizer.clone(), authorize))
///         .layer(Extension(RouteMeta::new("widgets", "list"))),
/// )
/// ```
///
/// Declaring the pair explicitly keeps the policy vocabulary decoupled from
/// handler naming. [`RouteMeta::from_route_names`] exists for callers
/// migrating routes that still encode the pair in framework-style
/// `FooResource` / `path/actions.Foo` names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMeta {
    resource: String,
    action: String,
}

impl RouteMeta {
    pub fn new(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
        }
    }

    /// Derives the pair from a declared resource name and a qualified handler
    /// name, stripping the conventional markers.
    pub fn from_route_names(resource_name: &str, handler_name: &str) -> Self {
        Self {
            resource: resource_from_declared(resource_name),
            action: action_from_handler(handler_name),
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn action(&self) -> &str {
        &self.action
    }
}

/// `"WidgetsResource"` -> `"Widgets"`. Names without the `Resource` marker
/// (including the empty string) derive to an empty resource.
fn resource_from_declared(declared: &str) -> String {
    declared
        .split_once("Resource")
        .map(|(head, _)| head.to_owned())
        .unwrap_or_default()
}

/// Takes the segment after the last `"/actions."` marker. Handler names can
/// come doubly qualified (module path plus type plus method); when that
/// segment still contains a `.`, the method name after the last `.` of the
/// full handler name wins.
fn action_from_handler(handler: &str) -> String {
    if handler.is_empty() {
        return String::new();
    }

    let tail = handler.rsplit("/actions.").next().unwrap_or(handler);
    if tail.contains('.') {
        handler.rsplit('.').next().unwrap_or_default().to_owned()
    } else {
        tail.to_owned()
    }
}
