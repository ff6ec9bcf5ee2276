use std::fmt;

/// A named server operation: one `(resource, action)` pair.
///
/// The resource may itself be dotted (`pages.aboutUs`); the action is the
/// last segment of the path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Procedure {
    resource: String,
    action: String,
}

impl Procedure {
    pub fn new(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
        }
    }

    /// Splits a full path such as `pages.aboutUs.updateOurMission`.
    pub fn parse(path: &str) -> Option<Self> {
        let (resource, action) = path.rsplit_once('.')?;
        if resource.is_empty() || action.is_empty() || resource.split('.').any(str::is_empty) {
            return None;
        }
        Some(Self::new(resource, action))
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    /// The full dotted path.
    pub fn path(&self) -> String {
        format!("{}.{}", self.resource, self.action)
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource, self.action)
    }
}
