/// Permissions checked by the service entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Read the stored submissions.
    ManageSubmissions,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ManageSubmissions => "manage_submissions",
        }
    }
}

/// The caller of a service operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Principal {
    capabilities: Vec<Capability>,
}

impl Principal {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn admin() -> Self {
        Self {
            capabilities: vec![Capability::ManageSubmissions],
        }
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}
