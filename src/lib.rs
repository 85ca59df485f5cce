// studio-provisioner - CloudFormation custom resources for SageMaker Studio
//
// Platform-agnostic lifecycle logic for the Studio domain and user profile
// custom resources. No AWS SDK and no HTTP here: the provisioning API, the
// clock and the response channel are all injected through traits.
//
// - Essence: event -> validated request -> create/update/delete state machine
//   -> exactly one outcome
// - Accident: SageMaker SDK, presigned-URL PUT, Lambda runtime
//   (see crates/studio-provisioner-lambda)

pub mod clock;
pub mod domain;
pub mod error;
pub mod lifecycle;
pub mod outcome;
pub mod poll;
pub mod profile;
pub mod provisioning;
pub mod request;
pub mod status;

pub use clock::{Clock, Deadline, SystemClock};
pub use domain::{DomainLifecycle, DOMAIN_ID_KEY};
pub use error::{ErrorCode, LifecycleError, ProvisioningError, ReportError};
pub use lifecycle::{handle_event, run_lifecycle, Reporter, ResourceLifecycle};
pub use outcome::{CustomResourceResponse, LifecycleOutcome, OutcomeStatus};
pub use poll::PollSettings;
pub use profile::{ProfileLifecycle, PROFILE_ARN_KEY, PROFILE_NAME_KEY};
pub use provisioning::{
    ApiResult, DomainApi, DomainSpec, ProfileApi, ProfileSpec, RetentionPolicy, TagChanges,
};
pub use request::{
    AuthMode, CustomResourceEvent, DomainProperties, LifecycleRequest, Operation,
    ProfileProperties, Tag,
};
pub use status::ResourceStatus;
