//! Challenge verification — one decision procedure per verification method.
//!
//! A challenge names its method via the closed [`VerificationMethod`] enum
//! and carries method-specific parameters; [`verifiers::run_verifier`]
//! dispatches exhaustively, so an unknown method is a compile error rather
//! than a silent no-op.
//!
//! Every verifier fails closed: no sensor reading, a coarse fix, or a
//! missing device capability all produce an unverified result with a
//! reason note — absence of evidence is never a pass. The boolean outcome
//! here is not final; the anti-cheat integrity gate intersects it before a
//! [`VerificationResult`] is produced.

pub mod camera;
pub mod challenge;
pub mod error;
pub mod geofence;
pub mod method;
pub mod outcomes;
pub mod verifiers;

pub use camera::{CameraFrame, LivenessEvidence};
pub use challenge::{Challenge, TimeOfDayWindow, VerificationParams};
pub use error::VerifyError;
pub use geofence::GeofenceTracker;
pub use method::VerificationMethod;
pub use outcomes::{VerificationResult, VerifierOutcome};
pub use verifiers::run_verifier;
