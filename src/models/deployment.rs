#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub id: u64,
    pub git_ref: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentState {
    Success,
    Other,
}

impl DeploymentState {
    pub fn from_api(state: &str) -> Self {
        if state == "success" {
            DeploymentState::Success
        } else {
            DeploymentState::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentStatus {
    pub state: DeploymentState,
    pub environment_url: Option<String>,
    pub creator_avatar_url: Option<String>,
}

/// A deployment that is live and reachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewDeployment {
    pub url: String,
    pub avatar_url: Option<String>,
}
