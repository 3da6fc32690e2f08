/// Process exit codes for fatal failures. Clap itself exits with 2 on usage errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureExitCode {
    Configuration = 1,
    Api = 3,
    Path = 4,
    SerializationFailed = 5,
}

impl FailureExitCode {
    pub fn for_error(error: &super::cli_error::CliError) -> Self {
        use super::cli_error::CliError::*;

        match error {
            CredentialsUnreadable { .. }
            | CredentialsMalformed(_)
            | CredentialsIncomplete(_)
            | InvalidServiceUrl(_)
            | InputError(_)
            | Json(_)
            | UnsupportedSystem => FailureExitCode::Configuration,
            PathNotFound(_) | Walk(_) | Io(_) => FailureExitCode::Path,
            Request(_)
            | APIAuthError
            | UnexpectedResponse(..)
            | NoWritableEnvironment
            | NoCollection
            | MultipleCollections(_) => FailureExitCode::Api,
        }
    }
}
