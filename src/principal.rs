/// Authenticated caller, inserted into the request extensions by whatever
/// authentication middleware runs upstream of [`authorize`](crate::authorize).
///
/// Keeping this a concrete type (instead of fishing an untyped "current user"
/// value out of the context at runtime) makes the dependency between the two
/// middlewares explicit at composition time.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub subject: String,
    pub role: String,
}

impl CurrentUser {
    pub fn new(subject: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            role: role.into(),
        }
    }
}
