//! Gate chain configuration.

use std::env;
use std::ffi::OsString;

use crate::error::Error;
use crate::handler::BoxedHandler;
use crate::middleware::{self, Credentials, MethodSet};

/// Environment variable holding `user:password` for basic auth.
pub const BASIC_AUTH_ENV: &str = "SH_BASIC_AUTH";

/// Settings shared by every gate chain the host builds.
#[derive(Clone, Debug)]
pub struct Config {
    /// Require these credentials on every request, when set.
    pub basic_auth: Option<Credentials>,
    /// Reported in the `Server` response header.
    pub version: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            basic_auth: None,
            version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }
}

impl Config {
    /// Defaults, with basic auth taken from `SH_BASIC_AUTH` when it is set
    /// and not empty.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidCredentials`] when the variable is set but is not
    /// valid Unicode or not of the form `user:password`.
    pub fn from_env() -> Result<Self, Error> {
        let basic_auth = parse_basic_auth(env::var_os(BASIC_AUTH_ENV))?;
        Ok(Self { basic_auth, ..Self::default() })
    }

    /// Builds the standard chain around `methods`:
    /// common headers, then access logging, then basic auth if configured,
    /// then method dispatch.
    pub fn wrap(&self, methods: MethodSet) -> Result<BoxedHandler, Error> {
        let mut handler = middleware::multi_method(methods)?;
        if let Some(credentials) = &self.basic_auth {
            handler = middleware::basic_auth(handler, credentials.clone());
        }
        let handler = middleware::logging(handler);
        Ok(middleware::common_headers(handler, &self.version))
    }
}

/// An unset or empty value disables auth. Anything else must parse.
fn parse_basic_auth(value: Option<OsString>) -> Result<Option<Credentials>, Error> {
    let Some(value) = value else {
        return Ok(None);
    };
    if value.is_empty() {
        return Ok(None);
    }
    let value = value.into_string().map_err(|_| Error::InvalidCredentials)?;
    value.parse().map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_auth_value_parsing() {
        assert!(parse_basic_auth(None).unwrap().is_none());
        assert!(parse_basic_auth(Some(OsString::new())).unwrap().is_none());
        assert_eq!(
            parse_basic_auth(Some("alice:secret".into())).unwrap(),
            Some(Credentials::new("alice", "secret")),
        );
        assert!(matches!(
            parse_basic_auth(Some("alice".into())),
            Err(Error::InvalidCredentials),
        ));
    }

    #[cfg(unix)]
    #[test]
    fn non_unicode_basic_auth_is_rejected() {
        use std::os::unix::ffi::OsStringExt;

        let value = OsString::from_vec(b"alice:s\xffecret".to_vec());
        assert!(matches!(parse_basic_auth(Some(value)), Err(Error::InvalidCredentials)));
    }

    // The only test touching the process environment.
    #[test]
    fn from_env_reads_basic_auth() {
        // SAFETY: no other test reads or writes SH_BASIC_AUTH.
        unsafe { env::remove_var(BASIC_AUTH_ENV) };
        assert!(Config::from_env().unwrap().basic_auth.is_none());

        unsafe { env::set_var(BASIC_AUTH_ENV, "alice:secret") };
        let config = Config::from_env().unwrap();
        assert_eq!(config.basic_auth, Some(Credentials::new("alice", "secret")));
        assert_eq!(config.version, env!("CARGO_PKG_VERSION"));

        unsafe { env::set_var(BASIC_AUTH_ENV, "") };
        assert!(Config::from_env().unwrap().basic_auth.is_none());

        unsafe { env::set_var(BASIC_AUTH_ENV, "no-colon") };
        assert!(matches!(Config::from_env(), Err(Error::InvalidCredentials)));

        #[cfg(unix)]
        {
            use std::os::unix::ffi::OsStrExt;

            let value = std::ffi::OsStr::from_bytes(b"alice:s\xffecret");
            unsafe { env::set_var(BASIC_AUTH_ENV, value) };
            assert!(matches!(Config::from_env(), Err(Error::InvalidCredentials)));
        }

        unsafe { env::remove_var(BASIC_AUTH_ENV) };
    }

    #[test]
    fn default_reports_crate_version() {
        let config = Config::default();
        assert_eq!(config.version, env!("CARGO_PKG_VERSION"));
        assert!(config.basic_auth.is_none());
    }

    #[test]
    fn wrap_surfaces_method_set_errors() {
        assert!(matches!(Config::default().wrap(MethodSet::new()), Err(Error::NoHandlers)));
    }
}
