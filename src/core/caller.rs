//! Caller location capture
//!
//! Call sites are captured with `#[track_caller]` on the public logging
//! methods (or with `file!`/`line!`/`module_path!` in the macros) and turned
//! into the `caller` field by a [`CallerResolver`].

use std::panic::Location;

/// Function segment of the `caller` field when the call site carries no
/// module path (method calls rather than macros).
pub const UNKNOWN_FUNCTION: &str = "?";

/// Where a log call was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub file: &'static str,
    pub line: u32,
    pub column: u32,
    /// Module path of the caller, when known (macros supply it).
    pub module_path: Option<&'static str>,
}

impl CallSite {
    pub const fn new(
        file: &'static str,
        line: u32,
        column: u32,
        module_path: Option<&'static str>,
    ) -> Self {
        Self {
            file,
            line,
            column,
            module_path,
        }
    }

    /// The call site of the nearest caller not marked `#[track_caller]`.
    #[track_caller]
    #[inline]
    pub fn caller() -> Self {
        Self::from_location(Location::caller())
    }

    pub fn from_location(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
            column: location.column(),
            module_path: None,
        }
    }

    /// Last component of the file path.
    pub fn file_name(&self) -> &'static str {
        self.file
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.file)
    }

    /// Last segment of the module path, or [`UNKNOWN_FUNCTION`].
    pub fn function(&self) -> &'static str {
        match self.module_path {
            Some(path) => path.rsplit("::").next().unwrap_or(path),
            None => UNKNOWN_FUNCTION,
        }
    }
}

/// Turns a call site into the text of the `caller` field.
pub trait CallerResolver: Send + Sync {
    fn resolve(&self, site: &CallSite) -> String;
}

/// `file.rs:line:function` using only the file name.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortCallerResolver;

impl CallerResolver for ShortCallerResolver {
    fn resolve(&self, site: &CallSite) -> String {
        format!("{}:{}:{}", site.file_name(), site.line, site.function())
    }
}

/// `path/to/file.rs:line:module::path` with nothing trimmed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullCallerResolver;

impl CallerResolver for FullCallerResolver {
    fn resolve(&self, site: &CallSite) -> String {
        match site.module_path {
            Some(path) => format!("{}:{}:{}", site.file, site.line, path),
            None => format!("{}:{}:{}", site.file, site.line, UNKNOWN_FUNCTION),
        }
    }
}

impl<F> CallerResolver for F
where
    F: Fn(&CallSite) -> String + Send + Sync,
{
    fn resolve(&self, site: &CallSite) -> String {
        self(site)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_resolver_with_module() {
        let site = CallSite::new("src/server/handlers.rs", 42, 9, Some("app::server::handlers"));
        assert_eq!(ShortCallerResolver.resolve(&site), "handlers.rs:42:handlers");
    }

    #[test]
    fn test_short_resolver_without_module() {
        let site = CallSite::new("src/main.rs", 7, 5, None);
        assert_eq!(ShortCallerResolver.resolve(&site), "main.rs:7:?");
        assert_eq!(FullCallerResolver.resolve(&site), "src/main.rs:7:?");
    }

    #[test]
    fn test_full_resolver() {
        let site = CallSite::new("src/main.rs", 7, 5, Some("app"));
        assert_eq!(FullCallerResolver.resolve(&site), "src/main.rs:7:app");
    }

    #[test]
    fn test_windows_separator() {
        let site = CallSite::new("src\\lib.rs", 1, 1, None);
        assert_eq!(site.file_name(), "lib.rs");
    }

    #[test]
    fn test_track_caller_capture() {
        let site = CallSite::caller();
        assert!(site.file.ends_with("caller.rs"));
        assert!(site.line > 0);
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |site: &CallSite| format!("line-{}", site.line);
        let site = CallSite::new("a.rs", 3, 1, None);
        assert_eq!(resolver.resolve(&site), "line-3");
    }
}
