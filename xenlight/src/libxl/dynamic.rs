//! Runtime-loaded libxl
//!
//! Implementation of [`Libxl`] resolving every entry point from
//! `libxenlight.so.4.14` and `libxentoollog.so.1` with `dlopen()`. Nothing
//! links against the Xen tools at build time.

use std::{
    ffi::{c_char, c_int, c_uint},
    io,
    os::fd::{AsFd, IntoRawFd},
    path::PathBuf,
};

use libloading::Library;
use nix::libc::{self, FILE};

use super::Libxl;
use crate::{
    ffi::{
        LibxlAsyncopHow, LibxlBitmap, LibxlCpupoolinfo, LibxlCtx, LibxlDominfo, LibxlPhysinfo,
        LibxlUuid, LibxlVcpuinfo, LibxlVersionInfo, XentoollogLevel, XentoollogLogger,
    },
    Error,
};

/// Shared objects to load.
#[derive(Clone, Debug)]
pub struct LibraryPaths {
    pub xenlight: PathBuf,
    pub toollog: PathBuf,
}

impl Default for LibraryPaths {
    fn default() -> Self {
        Self {
            xenlight: "libxenlight.so.4.14".into(),
            toollog: "libxentoollog.so.1".into(),
        }
    }
}

macro_rules! symbols {
    ($($lib:ident { $($field:ident = $name:literal: fn($($arg:ty),*) $(-> $ret:ty)?;)* })*) => {
        struct Symbols {
            $($($field: unsafe extern "C" fn($($arg),*) $(-> $ret)?,)*)*
        }

        impl Symbols {
            /// SAFETY: the declared signatures must match the loaded libraries.
            unsafe fn resolve($($lib: &Library),*) -> Result<Self, libloading::Error> {
                Ok(Self {
                    $($($field: *$lib.get::<unsafe extern "C" fn($($arg),*) $(-> $ret)?>(
                        concat!($name, "\0").as_bytes()
                    )?,)*)*
                })
            }
        }
    };
}

symbols! {
    toollog {
        xtl_createlogger_stdiostream = "xtl_createlogger_stdiostream":
            fn(*mut FILE, XentoollogLevel, c_uint) -> *mut XentoollogLogger;
        xtl_logger_destroy = "xtl_logger_destroy": fn(*mut XentoollogLogger);
    }
    xenlight {
        ctx_alloc = "libxl_ctx_alloc": fn(*mut *mut LibxlCtx, c_int, c_uint, *mut XentoollogLogger) -> c_int;
        ctx_free = "libxl_ctx_free": fn(*mut LibxlCtx) -> c_int;

        get_physinfo = "libxl_get_physinfo": fn(*mut LibxlCtx, *mut LibxlPhysinfo) -> c_int;
        physinfo_dispose = "libxl_physinfo_dispose": fn(*mut LibxlPhysinfo);
        get_version_info = "libxl_get_version_info": fn(*mut LibxlCtx) -> *const LibxlVersionInfo;
        get_max_cpus = "libxl_get_max_cpus": fn(*mut LibxlCtx) -> c_int;
        get_online_cpus = "libxl_get_online_cpus": fn(*mut LibxlCtx) -> c_int;
        get_max_nodes = "libxl_get_max_nodes": fn(*mut LibxlCtx) -> c_int;
        get_free_memory = "libxl_get_free_memory": fn(*mut LibxlCtx, *mut u64) -> c_int;

        list_domain = "libxl_list_domain": fn(*mut LibxlCtx, *mut c_int) -> *mut LibxlDominfo;
        dominfo_list_free = "libxl_dominfo_list_free": fn(*mut LibxlDominfo, c_int);
        domain_info = "libxl_domain_info": fn(*mut LibxlCtx, *mut LibxlDominfo, u32) -> c_int;
        dominfo_dispose = "libxl_dominfo_dispose": fn(*mut LibxlDominfo);
        list_vcpu = "libxl_list_vcpu": fn(*mut LibxlCtx, u32, *mut c_int, *mut c_int) -> *mut LibxlVcpuinfo;
        vcpuinfo_list_free = "libxl_vcpuinfo_list_free": fn(*mut LibxlVcpuinfo, c_int);
        domain_pause = "libxl_domain_pause": fn(*mut LibxlCtx, u32, *const LibxlAsyncopHow) -> c_int;
        domain_unpause = "libxl_domain_unpause": fn(*mut LibxlCtx, u32, *const LibxlAsyncopHow) -> c_int;
        domain_shutdown = "libxl_domain_shutdown": fn(*mut LibxlCtx, u32, *const LibxlAsyncopHow) -> c_int;
        domain_reboot = "libxl_domain_reboot": fn(*mut LibxlCtx, u32, *const LibxlAsyncopHow) -> c_int;
        domain_destroy = "libxl_domain_destroy": fn(*mut LibxlCtx, u32, *const LibxlAsyncopHow) -> c_int;
        console_get_tty = "libxl_console_get_tty": fn(*mut LibxlCtx, u32, c_int, c_int, *mut *mut c_char) -> c_int;
        primary_console_get_tty = "libxl_primary_console_get_tty": fn(*mut LibxlCtx, u32, *mut *mut c_char) -> c_int;

        list_cpupool = "libxl_list_cpupool": fn(*mut LibxlCtx, *mut c_int) -> *mut LibxlCpupoolinfo;
        cpupoolinfo_list_free = "libxl_cpupoolinfo_list_free": fn(*mut LibxlCpupoolinfo, c_int);
        cpupool_info = "libxl_cpupool_info": fn(*mut LibxlCtx, *mut LibxlCpupoolinfo, u32) -> c_int;
        cpupoolinfo_dispose = "libxl_cpupoolinfo_dispose": fn(*mut LibxlCpupoolinfo);
        cpupool_create = "libxl_cpupool_create": fn(*mut LibxlCtx, *const c_char, c_int, LibxlBitmap, *mut LibxlUuid, *mut u32) -> c_int;
        cpupool_destroy = "libxl_cpupool_destroy": fn(*mut LibxlCtx, u32) -> c_int;
        cpupool_rename = "libxl_cpupool_rename": fn(*mut LibxlCtx, *const c_char, u32) -> c_int;
        cpupool_cpuadd = "libxl_cpupool_cpuadd": fn(*mut LibxlCtx, u32, c_int) -> c_int;
        cpupool_cpuadd_cpumap = "libxl_cpupool_cpuadd_cpumap": fn(*mut LibxlCtx, u32, *const LibxlBitmap) -> c_int;
        cpupool_cpuadd_node = "libxl_cpupool_cpuadd_node": fn(*mut LibxlCtx, u32, c_int, *mut c_int) -> c_int;
        cpupool_cpuremove = "libxl_cpupool_cpuremove": fn(*mut LibxlCtx, u32, c_int) -> c_int;
        cpupool_cpuremove_cpumap = "libxl_cpupool_cpuremove_cpumap": fn(*mut LibxlCtx, u32, *const LibxlBitmap) -> c_int;
        cpupool_cpuremove_node = "libxl_cpupool_cpuremove_node": fn(*mut LibxlCtx, u32, c_int, *mut c_int) -> c_int;
        cpupool_movedomain = "libxl_cpupool_movedomain": fn(*mut LibxlCtx, u32, u32) -> c_int;
    }
}

/// libxl loaded from the system.
pub struct DynLibxl {
    symbols: Symbols,
    /// stdio stream over a duplicate of stderr, shared by every logger.
    stderr: *mut FILE,
    // Keep the libraries mapped as long as `symbols` may be called.
    _xenlight: Library,
    _toollog: Library,
}

impl std::fmt::Debug for DynLibxl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynLibxl").finish_non_exhaustive()
    }
}

impl DynLibxl {
    pub fn open(paths: &LibraryPaths) -> Result<Self, Error> {
        tracing::debug!("loading {:?} and {:?}", paths.xenlight, paths.toollog);

        // SAFETY: these are the Xen tools libraries, their initializers have no
        //         requirements and the signatures above follow their headers.
        let (toollog, xenlight, symbols) = unsafe {
            let toollog = Library::new(&paths.toollog)?;
            let xenlight = Library::new(&paths.xenlight)?;
            let symbols = Symbols::resolve(&toollog, &xenlight)?;

            (toollog, xenlight, symbols)
        };

        let fd = io::stderr().as_fd().try_clone_to_owned()?.into_raw_fd();

        // SAFETY: `fd` is a freshly duplicated descriptor that the stream takes over.
        let stderr = unsafe { libc::fdopen(fd, c"w".as_ptr()) };
        if stderr.is_null() {
            let e = io::Error::last_os_error();
            // SAFETY: fdopen failed, so `fd` is still ours.
            unsafe { libc::close(fd) };
            return Err(e.into());
        }

        Ok(Self {
            symbols,
            stderr,
            _xenlight: xenlight,
            _toollog: toollog,
        })
    }
}

impl Drop for DynLibxl {
    fn drop(&mut self) {
        // SAFETY: `stderr` came from fdopen and loggers using it are gone with
        //         the contexts that borrowed this backend.
        unsafe { libc::fclose(self.stderr) };
    }
}

impl Libxl for DynLibxl {
    unsafe fn logger_create(
        &self,
        level: XentoollogLevel,
        flags: c_uint,
    ) -> *mut XentoollogLogger {
        (self.symbols.xtl_createlogger_stdiostream)(self.stderr, level, flags)
    }

    unsafe fn logger_destroy(&self, logger: *mut XentoollogLogger) {
        (self.symbols.xtl_logger_destroy)(logger)
    }

    unsafe fn ctx_alloc(
        &self,
        pctx: *mut *mut LibxlCtx,
        version: c_int,
        flags: c_uint,
        logger: *mut XentoollogLogger,
    ) -> c_int {
        (self.symbols.ctx_alloc)(pctx, version, flags, logger)
    }

    unsafe fn ctx_free(&self, ctx: *mut LibxlCtx) -> c_int {
        (self.symbols.ctx_free)(ctx)
    }

    unsafe fn get_physinfo(&self, ctx: *mut LibxlCtx, physinfo: *mut LibxlPhysinfo) -> c_int {
        (self.symbols.get_physinfo)(ctx, physinfo)
    }

    unsafe fn physinfo_dispose(&self, physinfo: *mut LibxlPhysinfo) {
        (self.symbols.physinfo_dispose)(physinfo)
    }

    unsafe fn get_version_info(&self, ctx: *mut LibxlCtx) -> *const LibxlVersionInfo {
        (self.symbols.get_version_info)(ctx)
    }

    unsafe fn get_max_cpus(&self, ctx: *mut LibxlCtx) -> c_int {
        (self.symbols.get_max_cpus)(ctx)
    }

    unsafe fn get_online_cpus(&self, ctx: *mut LibxlCtx) -> c_int {
        (self.symbols.get_online_cpus)(ctx)
    }

    unsafe fn get_max_nodes(&self, ctx: *mut LibxlCtx) -> c_int {
        (self.symbols.get_max_nodes)(ctx)
    }

    unsafe fn get_free_memory(&self, ctx: *mut LibxlCtx, memkb: *mut u64) -> c_int {
        (self.symbols.get_free_memory)(ctx, memkb)
    }

    unsafe fn list_domain(&self, ctx: *mut LibxlCtx, nb_domain: *mut c_int) -> *mut LibxlDominfo {
        (self.symbols.list_domain)(ctx, nb_domain)
    }

    unsafe fn dominfo_list_free(&self, list: *mut LibxlDominfo, nb_domain: c_int) {
        (self.symbols.dominfo_list_free)(list, nb_domain)
    }

    unsafe fn domain_info(
        &self,
        ctx: *mut LibxlCtx,
        info: *mut LibxlDominfo,
        domid: u32,
    ) -> c_int {
        (self.symbols.domain_info)(ctx, info, domid)
    }

    unsafe fn dominfo_dispose(&self, info: *mut LibxlDominfo) {
        (self.symbols.dominfo_dispose)(info)
    }

    unsafe fn list_vcpu(
        &self,
        ctx: *mut LibxlCtx,
        domid: u32,
        nb_vcpu: *mut c_int,
        nr_cpus: *mut c_int,
    ) -> *mut LibxlVcpuinfo {
        (self.symbols.list_vcpu)(ctx, domid, nb_vcpu, nr_cpus)
    }

    unsafe fn vcpuinfo_list_free(&self, list: *mut LibxlVcpuinfo, nb_vcpu: c_int) {
        (self.symbols.vcpuinfo_list_free)(list, nb_vcpu)
    }

    unsafe fn domain_pause(
        &self,
        ctx: *mut LibxlCtx,
        domid: u32,
        ao_how: *const LibxlAsyncopHow,
    ) -> c_int {
        (self.symbols.domain_pause)(ctx, domid, ao_how)
    }

    unsafe fn domain_unpause(
        &self,
        ctx: *mut LibxlCtx,
        domid: u32,
        ao_how: *const LibxlAsyncopHow,
    ) -> c_int {
        (self.symbols.domain_unpause)(ctx, domid, ao_how)
    }

    unsafe fn domain_shutdown(
        &self,
        ctx: *mut LibxlCtx,
        domid: u32,
        ao_how: *const LibxlAsyncopHow,
    ) -> c_int {
        (self.symbols.domain_shutdown)(ctx, domid, ao_how)
    }

    unsafe fn domain_reboot(
        &self,
        ctx: *mut LibxlCtx,
        domid: u32,
        ao_how: *const LibxlAsyncopHow,
    ) -> c_int {
        (self.symbols.domain_reboot)(ctx, domid, ao_how)
    }

    unsafe fn domain_destroy(
        &self,
        ctx: *mut LibxlCtx,
        domid: u32,
        ao_how: *const LibxlAsyncopHow,
    ) -> c_int {
        (self.symbols.domain_destroy)(ctx, domid, ao_how)
    }

    unsafe fn console_get_tty(
        &self,
        ctx: *mut LibxlCtx,
        domid: u32,
        cons_num: c_int,
        console_type: c_int,
        path: *mut *mut c_char,
    ) -> c_int {
        (self.symbols.console_get_tty)(ctx, domid, cons_num, console_type, path)
    }

    unsafe fn primary_console_get_tty(
        &self,
        ctx: *mut LibxlCtx,
        domid: u32,
        path: *mut *mut c_char,
    ) -> c_int {
        (self.symbols.primary_console_get_tty)(ctx, domid, path)
    }

    unsafe fn list_cpupool(
        &self,
        ctx: *mut LibxlCtx,
        nb_pool: *mut c_int,
    ) -> *mut LibxlCpupoolinfo {
        (self.symbols.list_cpupool)(ctx, nb_pool)
    }

    unsafe fn cpupoolinfo_list_free(&self, list: *mut LibxlCpupoolinfo, nb_pool: c_int) {
        (self.symbols.cpupoolinfo_list_free)(list, nb_pool)
    }

    unsafe fn cpupool_info(
        &self,
        ctx: *mut LibxlCtx,
        info: *mut LibxlCpupoolinfo,
        poolid: u32,
    ) -> c_int {
        (self.symbols.cpupool_info)(ctx, info, poolid)
    }

    unsafe fn cpupoolinfo_dispose(&self, info: *mut LibxlCpupoolinfo) {
        (self.symbols.cpupoolinfo_dispose)(info)
    }

    unsafe fn cpupool_create(
        &self,
        ctx: *mut LibxlCtx,
        name: *const c_char,
        sched: c_int,
        cpumap: LibxlBitmap,
        uuid: *mut LibxlUuid,
        poolid: *mut u32,
    ) -> c_int {
        (self.symbols.cpupool_create)(ctx, name, sched, cpumap, uuid, poolid)
    }

    unsafe fn cpupool_destroy(&self, ctx: *mut LibxlCtx, poolid: u32) -> c_int {
        (self.symbols.cpupool_destroy)(ctx, poolid)
    }

    unsafe fn cpupool_rename(
        &self,
        ctx: *mut LibxlCtx,
        name: *const c_char,
        poolid: u32,
    ) -> c_int {
        (self.symbols.cpupool_rename)(ctx, name, poolid)
    }

    unsafe fn cpupool_cpuadd(&self, ctx: *mut LibxlCtx, poolid: u32, cpu: c_int) -> c_int {
        (self.symbols.cpupool_cpuadd)(ctx, poolid, cpu)
    }

    unsafe fn cpupool_cpuadd_cpumap(
        &self,
        ctx: *mut LibxlCtx,
        poolid: u32,
        cpumap: *const LibxlBitmap,
    ) -> c_int {
        (self.symbols.cpupool_cpuadd_cpumap)(ctx, poolid, cpumap)
    }

    unsafe fn cpupool_cpuadd_node(
        &self,
        ctx: *mut LibxlCtx,
        poolid: u32,
        node: c_int,
        cpus: *mut c_int,
    ) -> c_int {
        (self.symbols.cpupool_cpuadd_node)(ctx, poolid, node, cpus)
    }

    unsafe fn cpupool_cpuremove(&self, ctx: *mut LibxlCtx, poolid: u32, cpu: c_int) -> c_int {
        (self.symbols.cpupool_cpuremove)(ctx, poolid, cpu)
    }

    unsafe fn cpupool_cpuremove_cpumap(
        &self,
        ctx: *mut LibxlCtx,
        poolid: u32,
        cpumap: *const LibxlBitmap,
    ) -> c_int {
        (self.symbols.cpupool_cpuremove_cpumap)(ctx, poolid, cpumap)
    }

    unsafe fn cpupool_cpuremove_node(
        &self,
        ctx: *mut LibxlCtx,
        poolid: u32,
        node: c_int,
        cpus: *mut c_int,
    ) -> c_int {
        (self.symbols.cpupool_cpuremove_node)(ctx, poolid, node, cpus)
    }

    unsafe fn cpupool_movedomain(&self, ctx: *mut LibxlCtx, poolid: u32, domid: u32) -> c_int {
        (self.symbols.cpupool_movedomain)(ctx, poolid, domid)
    }
}
