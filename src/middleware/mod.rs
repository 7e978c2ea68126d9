pub(crate) mod authorize;
