use std::error;
use std::fmt;

/// Result type used throughout the crate.
pub type SweepResult<T> = Result<T, SweepError>;

/// Main error type of the sweep library.
///
/// A [`SweepError`] carries an [`ErrorKind`], a static description and optionally a
/// dynamic detail. The kind is what callers branch on: the reconciliation pass, for
/// example, treats [`ErrorKind::ResourceNotFound`] as a successful no-op.
#[derive(Debug, Clone)]
pub struct SweepError {
    repr: ErrorRepr,
}

#[derive(Debug, Clone)]
enum ErrorRepr {
    WithDescription(ErrorKind, &'static str),
    WithDescriptionAndDetail(ErrorKind, &'static str, String),
}

/// Categories of errors a sweep can run into.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    // Cluster access
    AuthenticationFailed,
    ListingFailed,

    // Mutations
    ResourceNotFound,
    MutationFailed,

    // Pass control
    TimeoutExceeded,

    // Local problems
    InvalidData,
    SerializationError,

    Unknown,
}

impl SweepError {
    /// Returns the [`ErrorKind`] of this error.
    pub fn kind(&self) -> ErrorKind {
        match self.repr {
            ErrorRepr::WithDescription(kind, _)
            | ErrorRepr::WithDescriptionAndDetail(kind, _, _) => kind,
        }
    }

    /// Returns the dynamic detail, if any.
    pub fn detail(&self) -> Option<&str> {
        match self.repr {
            ErrorRepr::WithDescriptionAndDetail(_, _, ref detail) => Some(detail.as_str()),
            ErrorRepr::WithDescription(..) => None,
        }
    }

    /// Returns `true` if the remote object the error refers to does not exist.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::ResourceNotFound
    }
}

/// Errors are equal when their kinds are.
impl PartialEq for SweepError {
    fn eq(&self, other: &SweepError) -> bool {
        self.kind() == other.kind()
    }
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.repr {
            ErrorRepr::WithDescription(kind, desc) => {
                fmt::Debug::fmt(&kind, f)?;
                f.write_str(": ")?;
                desc.fmt(f)
            }
            ErrorRepr::WithDescriptionAndDetail(kind, desc, ref detail) => {
                fmt::Debug::fmt(&kind, f)?;
                f.write_str(": ")?;
                desc.fmt(f)?;
                f.write_str(" -> ")?;
                detail.fmt(f)
            }
        }
    }
}

impl error::Error for SweepError {}

impl From<(ErrorKind, &'static str)> for SweepError {
    fn from((kind, desc): (ErrorKind, &'static str)) -> SweepError {
        SweepError {
            repr: ErrorRepr::WithDescription(kind, desc),
        }
    }
}

impl From<(ErrorKind, &'static str, String)> for SweepError {
    fn from((kind, desc, detail): (ErrorKind, &'static str, String)) -> SweepError {
        SweepError {
            repr: ErrorRepr::WithDescriptionAndDetail(kind, desc, detail),
        }
    }
}

/// Converts [`kube::Error`] to [`SweepError`] based on the HTTP status of API errors.
///
/// Callers that know whether they were listing or mutating should prefer the more
/// specific mapping in [`crate::k8s`], which uses this as a fallback.
impl From<kube::Error> for SweepError {
    fn from(err: kube::Error) -> SweepError {
        let (kind, description) = match &err {
            kube::Error::Api(response) => match response.code {
                404 => (ErrorKind::ResourceNotFound, "Kubernetes resource not found"),
                401 | 403 => (
                    ErrorKind::AuthenticationFailed,
                    "Kubernetes API rejected the credentials",
                ),
                _ => (ErrorKind::Unknown, "Kubernetes API returned an error"),
            },
            kube::Error::Auth(_) => (
                ErrorKind::AuthenticationFailed,
                "Kubernetes client authentication failed",
            ),
            kube::Error::InferConfig(_) => (
                ErrorKind::AuthenticationFailed,
                "Kubernetes client configuration could not be inferred",
            ),
            kube::Error::SerdeError(_) => (
                ErrorKind::SerializationError,
                "Kubernetes payload could not be (de)serialized",
            ),
            _ => (ErrorKind::Unknown, "Kubernetes client request failed"),
        };

        SweepError {
            repr: ErrorRepr::WithDescriptionAndDetail(kind, description, err.to_string()),
        }
    }
}

/// Converts [`kube::config::InferConfigError`] to [`ErrorKind::AuthenticationFailed`].
impl From<kube::config::InferConfigError> for SweepError {
    fn from(err: kube::config::InferConfigError) -> SweepError {
        SweepError {
            repr: ErrorRepr::WithDescriptionAndDetail(
                ErrorKind::AuthenticationFailed,
                "Failed to infer cluster credentials",
                err.to_string(),
            ),
        }
    }
}

/// Converts [`kube::config::InClusterError`] to [`ErrorKind::AuthenticationFailed`].
impl From<kube::config::InClusterError> for SweepError {
    fn from(err: kube::config::InClusterError) -> SweepError {
        SweepError {
            repr: ErrorRepr::WithDescriptionAndDetail(
                ErrorKind::AuthenticationFailed,
                "Failed to load in-cluster credentials",
                err.to_string(),
            ),
        }
    }
}

/// Converts [`kube::config::KubeconfigError`] to [`ErrorKind::AuthenticationFailed`].
impl From<kube::config::KubeconfigError> for SweepError {
    fn from(err: kube::config::KubeconfigError) -> SweepError {
        SweepError {
            repr: ErrorRepr::WithDescriptionAndDetail(
                ErrorKind::AuthenticationFailed,
                "Failed to load kubeconfig credentials",
                err.to_string(),
            ),
        }
    }
}
