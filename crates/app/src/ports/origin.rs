//! Origin port: one configured connection to a vendor controller.
//!
//! Adapters implement the fetch/merge and action-request halves; the
//! service owns diffing, queues, and rule evaluation. The trait is
//! object-safe (`async_trait`) because the service holds a heterogeneous
//! set of origins.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use luma_domain::error::LumaError;
use luma_domain::snapshot::OriginSnapshot;
use luma_domain::stage::Stage;

/// The set of configured origins, keyed by configured name.
pub type Origins = HashMap<String, Arc<dyn Origin>>;

/// A fully resolved action request, addressed in vendor terms.
///
/// The service resolves configured group/scene *names* before calling the
/// adapter: `group` is the vendor-unique group id, `scene_label` the
/// vendor-side label to recall (when the target is a scene), and `stage`
/// the stage to apply, either the direct target or the scene's fallback
/// for origins without native scene support.
#[derive(Debug, Clone, PartialEq)]
pub struct OriginCommand {
    /// Vendor-unique id of the group to drive.
    pub group: String,
    /// Vendor scene label to recall, when the target is a scene.
    pub scene_label: Option<String>,
    /// Stage to apply, direct or fallback.
    pub stage: Option<Stage>,
}

/// A pluggable vendor connection.
///
/// The service calls [`refresh`](Self::refresh) on its poll interval and
/// diffs consecutive snapshots itself; [`perform`](Self::perform) is
/// called by the action worker for each dispatched [`OriginCommand`].
#[async_trait]
pub trait Origin: Send + Sync {
    /// Configured origin name (e.g. `"hue"`).
    fn name(&self) -> &str;

    /// Fetch the vendor's current state and merge it into one snapshot.
    async fn refresh(&self) -> Result<OriginSnapshot, LumaError>;

    /// Execute an action request against the vendor.
    async fn perform(&self, command: &OriginCommand) -> Result<(), LumaError>;
}
