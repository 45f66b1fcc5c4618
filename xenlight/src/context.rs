//! libxl context lifecycle
//!
//! A [`Context`] is either closed or open. Opening creates the xentoollog
//! diagnostic sink then the libxl context bound to it; closing releases both.
//! Every facade operation goes through [`LibxlHandle::check_open`] first and
//! fails with [`Error::NotOpen`] on a closed context without reaching libxl.

use std::{ffi::c_uint, fmt, ptr, str::FromStr};

use bitflags::bitflags;

use crate::{
    error::{Error, LibxlError, Result},
    ffi::{self, LibxlCtx, XentoollogLevel, XentoollogLogger},
    libxl::{DynLibxl, LibraryPaths, Libxl},
};

/// Minimum level of the messages libxl writes to stderr.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SinkLevel {
    Debug,
    Verbose,
    Detail,
    Progress,
    Info,
    Notice,
    Warn,
    #[default]
    Error,
    Critical,
    /// Log nothing.
    None,
}

impl SinkLevel {
    const NAMES: [(SinkLevel, &'static str); 10] = [
        (SinkLevel::Debug, "debug"),
        (SinkLevel::Verbose, "verbose"),
        (SinkLevel::Detail, "detail"),
        (SinkLevel::Progress, "progress"),
        (SinkLevel::Info, "info"),
        (SinkLevel::Notice, "notice"),
        (SinkLevel::Warn, "warn"),
        (SinkLevel::Error, "error"),
        (SinkLevel::Critical, "critical"),
        (SinkLevel::None, "none"),
    ];

    pub fn as_raw(self) -> XentoollogLevel {
        match self {
            SinkLevel::Debug => ffi::XTL_DEBUG,
            SinkLevel::Verbose => ffi::XTL_VERBOSE,
            SinkLevel::Detail => ffi::XTL_DETAIL,
            SinkLevel::Progress => ffi::XTL_PROGRESS,
            SinkLevel::Info => ffi::XTL_INFO,
            SinkLevel::Notice => ffi::XTL_NOTICE,
            SinkLevel::Warn => ffi::XTL_WARN,
            SinkLevel::Error => ffi::XTL_ERROR,
            SinkLevel::Critical => ffi::XTL_CRITICAL,
            // xentoollog has no "off" level, nothing is logged above critical.
            SinkLevel::None => ffi::XTL_CRITICAL + 1,
        }
    }
}

impl fmt::Display for SinkLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = Self::NAMES
            .iter()
            .find(|(level, _)| level == self)
            .map_or("?", |(_, name)| *name);

        f.write_str(name)
    }
}

#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown log level {0:?}")]
pub struct ParseSinkLevelError(String);

impl FromStr for SinkLevel {
    type Err = ParseSinkLevelError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::NAMES
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(s))
            .map(|(level, _)| *level)
            .ok_or_else(|| ParseSinkLevelError(s.to_string()))
    }
}

bitflags! {
  /// Formatting options of the stderr sink (`XTL_STDIOSTREAM_*`).
  #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
  pub struct SinkFlags: c_uint {
    const SHOW_PID = 1 << 0;
    const SHOW_DATE = 1 << 1;
    const HIDE_PROGRESS = 1 << 2;
    const PROGRESS_USE_CR = 1 << 3;
  }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ContextConfig {
    pub sink_level: SinkLevel,
    pub sink_flags: SinkFlags,
    /// Passed verbatim to `libxl_ctx_alloc`.
    pub flags: c_uint,
}

struct Handle {
    ctx: *mut LibxlCtx,
    logger: *mut XentoollogLogger,
}

/// Access to an open libxl context, as used by the facade traits.
pub trait LibxlHandle {
    type Lib: Libxl;

    fn lib(&self) -> &Self::Lib;

    /// Raw context, or [`Error::NotOpen`].
    fn check_open(&self) -> Result<*mut LibxlCtx>;
}

/// libxl context.
///
/// Holds raw pointers and is thus neither `Send` nor `Sync`.
pub struct Context<L: Libxl> {
    lib: L,
    config: ContextConfig,
    handle: Option<Handle>,
}

impl Context<DynLibxl> {
    /// Load libxl from the default locations and open a context on it.
    pub fn open_default() -> Result<Self> {
        let mut context = Context::new(DynLibxl::open(&LibraryPaths::default())?);
        context.open()?;
        Ok(context)
    }
}

impl<L: Libxl> Context<L> {
    /// Closed context over `lib`.
    pub fn new(lib: L) -> Self {
        Self::with_config(lib, ContextConfig::default())
    }

    pub fn with_config(lib: L, config: ContextConfig) -> Self {
        Self {
            lib,
            config,
            handle: None,
        }
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Open the context. Does nothing if it is already open.
    pub fn open(&mut self) -> Result<()> {
        if self.is_open() {
            return Ok(());
        }

        let logger = unsafe {
            self.lib
                .logger_create(self.config.sink_level.as_raw(), self.config.sink_flags.bits())
        };

        if logger.is_null() {
            return Err(Error::Logger);
        }

        let mut ctx = ptr::null_mut();
        let ret = unsafe {
            self.lib
                .ctx_alloc(&mut ctx, ffi::LIBXL_VERSION, self.config.flags, logger)
        };

        if let Err(e) = Error::check(ret) {
            unsafe { self.lib.logger_destroy(logger) };
            return Err(e);
        }

        if let Err(e) = self.check_version(ctx) {
            unsafe {
                self.lib.ctx_free(ctx);
                self.lib.logger_destroy(logger);
            }
            return Err(e);
        }

        tracing::debug!("libxl context opened");
        self.handle = Some(Handle { ctx, logger });
        Ok(())
    }

    /// Refuse any Xen release other than the one [`ffi`] is laid out for.
    fn check_version(&self, ctx: *mut LibxlCtx) -> Result<()> {
        let info = unsafe { self.lib.get_version_info(ctx).as_ref() }.ok_or(LibxlError::Fail)?;
        let (major, minor) = (info.xen_version_major, info.xen_version_minor);

        if (major, minor) != ffi::SUPPORTED_XEN_VERSION {
            tracing::error!("libxl reports Xen {major}.{minor}, refusing to use it");
            return Err(Error::UnsupportedVersion { major, minor });
        }

        Ok(())
    }

    /// Close the context. Does nothing if it is not open.
    ///
    /// The diagnostic sink is always released, even when releasing the libxl
    /// context fails; that failure is still reported.
    pub fn close(&mut self) -> Result<()> {
        let Some(Handle { ctx, logger }) = self.handle.take() else {
            return Ok(());
        };

        let ret = unsafe { self.lib.ctx_free(ctx) };
        unsafe { self.lib.logger_destroy(logger) };

        tracing::debug!("libxl context closed ({ret})");
        Error::check(ret)
    }
}

impl<L: Libxl> LibxlHandle for Context<L> {
    type Lib = L;

    fn lib(&self) -> &L {
        &self.lib
    }

    fn check_open(&self) -> Result<*mut LibxlCtx> {
        self.handle
            .as_ref()
            .map(|handle| handle.ctx)
            .ok_or(Error::NotOpen)
    }
}

impl<L: Libxl> Drop for Context<L> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!("Unable to close libxl context: {e}");
        }
    }
}

impl<L: Libxl + fmt::Debug> fmt::Debug for Context<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("lib", &self.lib)
            .field("config", &self.config)
            .field("open", &self.is_open())
            .finish()
    }
}
