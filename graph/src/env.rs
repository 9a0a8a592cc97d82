use envconfig::Envconfig;
use lazy_static::lazy_static;
use std::str::FromStr;

lazy_static! {
    pub static ref ENV_VARS: EnvVars = EnvVars::from_env().unwrap();
}

#[derive(Clone, Debug)]
pub struct EnvVars {
    inner: Inner,
}

impl EnvVars {
    pub fn from_env() -> Result<Self, envconfig::Error> {
        let inner = Inner::init_from_env()?;
        Ok(Self { inner })
    }

    /// Cursor tokens longer than this are rejected before they are base64
    /// decoded. The limit is on the encoded token, in characters.
    ///
    /// Set by the environment variable `VIEWGRAPH_CURSOR_MAX_LENGTH`. The
    /// default value is 8192.
    pub fn cursor_max_length(&self) -> usize {
        self.inner.cursor_max_length.0
    }

    /// Maximum number of entries in each of the memoization caches used by
    /// fetch planning.
    ///
    /// Set by the environment variable `VIEWGRAPH_SELECTION_CACHE_SIZE`. The
    /// default value is 10000.
    pub fn selection_cache_size(&self) -> usize {
        self.inner.selection_cache_size
    }

    /// The page size to use when a query gives neither `first` nor `last`
    /// nor a cursor. When unset, the provider default applies, which is
    /// unbounded.
    ///
    /// Set by the environment variable `VIEWGRAPH_DEFAULT_PAGE_SIZE`.
    pub fn default_page_size(&self) -> Option<u32> {
        self.inner.default_page_size
    }

    /// Log filter directives in `env_logger` syntax, e.g.
    /// `viewgraph_graphql::cursor=debug`.
    ///
    /// Set by the environment variable `VIEWGRAPH_LOG`.
    pub fn log_levels(&self) -> Option<&str> {
        self.inner.log_levels.as_deref()
    }

    /// Log every resolved fetch plan at `debug` level.
    ///
    /// Set by the flag `VIEWGRAPH_LOG_FETCH_PLANS`. Off by default.
    pub fn log_fetch_plans(&self) -> bool {
        self.inner.log_fetch_plans.0
    }
}

#[derive(Clone, Debug, Envconfig)]
struct Inner {
    #[envconfig(from = "VIEWGRAPH_CURSOR_MAX_LENGTH", default = "8_192")]
    cursor_max_length: WithoutUnderscores<usize>,
    #[envconfig(from = "VIEWGRAPH_SELECTION_CACHE_SIZE", default = "10000")]
    selection_cache_size: usize,
    #[envconfig(from = "VIEWGRAPH_DEFAULT_PAGE_SIZE")]
    default_page_size: Option<u32>,
    #[envconfig(from = "VIEWGRAPH_LOG_FETCH_PLANS", default = "false")]
    log_fetch_plans: EnvVarBoolean,
    #[envconfig(from = "VIEWGRAPH_LOG")]
    log_levels: Option<String>,
}

#[derive(Copy, Clone, Debug)]
struct EnvVarBoolean(pub bool);

impl FromStr for EnvVarBoolean {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "true" | "1" => Ok(Self(true)),
            "false" | "0" => Ok(Self(false)),
            _ => Err("Invalid env. var. flag, expected true / false / 1 / 0".to_string()),
        }
    }
}

#[derive(Copy, Clone, Debug)]
struct WithoutUnderscores<T>(pub T);

impl<T> FromStr for WithoutUnderscores<T>
where
    T: FromStr,
    T::Err: ToString,
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match T::from_str(s.replace('_', "").as_str()) {
            Ok(x) => Ok(Self(x)),
            Err(e) => Err(e.to_string()),
        }
    }
}
