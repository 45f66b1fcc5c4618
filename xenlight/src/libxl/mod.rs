//! libxl entry points
//!
//! [`Libxl`] abstracts the mechanism by which libxl functions are reached, in
//! the same way a hypercall backend abstracts privcmd. [`dynamic::DynLibxl`]
//! resolves them from the shared objects installed by the Xen tools.
//!
//! Every method is a 1:1 mirror of a C function and is as unsafe as the C
//! function it stands for: pointers must be valid for the documented access
//! and ownership of returned memory follows libxl's rules.

pub mod dynamic;

use std::ffi::{c_char, c_int, c_uint};

use crate::ffi::{
    LibxlAsyncopHow, LibxlBitmap, LibxlCpupoolinfo, LibxlCtx, LibxlDominfo, LibxlPhysinfo,
    LibxlUuid, LibxlVcpuinfo, LibxlVersionInfo, XentoollogLevel, XentoollogLogger,
};

pub use dynamic::{DynLibxl, LibraryPaths};

#[allow(clippy::missing_safety_doc)]
pub trait Libxl {
    /// `xtl_createlogger_stdiostream` over the backend's stderr stream.
    unsafe fn logger_create(&self, level: XentoollogLevel, flags: c_uint)
        -> *mut XentoollogLogger;

    /// `xtl_logger_destroy`
    unsafe fn logger_destroy(&self, logger: *mut XentoollogLogger);

    unsafe fn ctx_alloc(
        &self,
        pctx: *mut *mut LibxlCtx,
        version: c_int,
        flags: c_uint,
        logger: *mut XentoollogLogger,
    ) -> c_int;

    unsafe fn ctx_free(&self, ctx: *mut LibxlCtx) -> c_int;

    // Host

    unsafe fn get_physinfo(&self, ctx: *mut LibxlCtx, physinfo: *mut LibxlPhysinfo) -> c_int;

    unsafe fn physinfo_dispose(&self, physinfo: *mut LibxlPhysinfo);

    /// Returned structure is cached in, and owned by, the context.
    unsafe fn get_version_info(&self, ctx: *mut LibxlCtx) -> *const LibxlVersionInfo;

    unsafe fn get_max_cpus(&self, ctx: *mut LibxlCtx) -> c_int;

    unsafe fn get_online_cpus(&self, ctx: *mut LibxlCtx) -> c_int;

    unsafe fn get_max_nodes(&self, ctx: *mut LibxlCtx) -> c_int;

    unsafe fn get_free_memory(&self, ctx: *mut LibxlCtx, memkb: *mut u64) -> c_int;

    // Domains

    unsafe fn list_domain(&self, ctx: *mut LibxlCtx, nb_domain: *mut c_int) -> *mut LibxlDominfo;

    unsafe fn dominfo_list_free(&self, list: *mut LibxlDominfo, nb_domain: c_int);

    unsafe fn domain_info(&self, ctx: *mut LibxlCtx, info: *mut LibxlDominfo, domid: u32)
        -> c_int;

    unsafe fn dominfo_dispose(&self, info: *mut LibxlDominfo);

    unsafe fn list_vcpu(
        &self,
        ctx: *mut LibxlCtx,
        domid: u32,
        nb_vcpu: *mut c_int,
        nr_cpus: *mut c_int,
    ) -> *mut LibxlVcpuinfo;

    unsafe fn vcpuinfo_list_free(&self, list: *mut LibxlVcpuinfo, nb_vcpu: c_int);

    unsafe fn domain_pause(
        &self,
        ctx: *mut LibxlCtx,
        domid: u32,
        ao_how: *const LibxlAsyncopHow,
    ) -> c_int;

    unsafe fn domain_unpause(
        &self,
        ctx: *mut LibxlCtx,
        domid: u32,
        ao_how: *const LibxlAsyncopHow,
    ) -> c_int;

    unsafe fn domain_shutdown(
        &self,
        ctx: *mut LibxlCtx,
        domid: u32,
        ao_how: *const LibxlAsyncopHow,
    ) -> c_int;

    unsafe fn domain_reboot(
        &self,
        ctx: *mut LibxlCtx,
        domid: u32,
        ao_how: *const LibxlAsyncopHow,
    ) -> c_int;

    unsafe fn domain_destroy(
        &self,
        ctx: *mut LibxlCtx,
        domid: u32,
        ao_how: *const LibxlAsyncopHow,
    ) -> c_int;

    /// On success `path` is allocated with `malloc` and owned by the caller.
    unsafe fn console_get_tty(
        &self,
        ctx: *mut LibxlCtx,
        domid: u32,
        cons_num: c_int,
        console_type: c_int,
        path: *mut *mut c_char,
    ) -> c_int;

    /// On success `path` is allocated with `malloc` and owned by the caller.
    unsafe fn primary_console_get_tty(
        &self,
        ctx: *mut LibxlCtx,
        domid: u32,
        path: *mut *mut c_char,
    ) -> c_int;

    // Cpupools

    unsafe fn list_cpupool(&self, ctx: *mut LibxlCtx, nb_pool: *mut c_int)
        -> *mut LibxlCpupoolinfo;

    unsafe fn cpupoolinfo_list_free(&self, list: *mut LibxlCpupoolinfo, nb_pool: c_int);

    unsafe fn cpupool_info(
        &self,
        ctx: *mut LibxlCtx,
        info: *mut LibxlCpupoolinfo,
        poolid: u32,
    ) -> c_int;

    unsafe fn cpupoolinfo_dispose(&self, info: *mut LibxlCpupoolinfo);

    /// `cpumap` is read, not retained.
    unsafe fn cpupool_create(
        &self,
        ctx: *mut LibxlCtx,
        name: *const c_char,
        sched: c_int,
        cpumap: LibxlBitmap,
        uuid: *mut LibxlUuid,
        poolid: *mut u32,
    ) -> c_int;

    unsafe fn cpupool_destroy(&self, ctx: *mut LibxlCtx, poolid: u32) -> c_int;

    unsafe fn cpupool_rename(&self, ctx: *mut LibxlCtx, name: *const c_char, poolid: u32)
        -> c_int;

    unsafe fn cpupool_cpuadd(&self, ctx: *mut LibxlCtx, poolid: u32, cpu: c_int) -> c_int;

    unsafe fn cpupool_cpuadd_cpumap(
        &self,
        ctx: *mut LibxlCtx,
        poolid: u32,
        cpumap: *const LibxlBitmap,
    ) -> c_int;

    unsafe fn cpupool_cpuadd_node(
        &self,
        ctx: *mut LibxlCtx,
        poolid: u32,
        node: c_int,
        cpus: *mut c_int,
    ) -> c_int;

    unsafe fn cpupool_cpuremove(&self, ctx: *mut LibxlCtx, poolid: u32, cpu: c_int) -> c_int;

    unsafe fn cpupool_cpuremove_cpumap(
        &self,
        ctx: *mut LibxlCtx,
        poolid: u32,
        cpumap: *const LibxlBitmap,
    ) -> c_int;

    unsafe fn cpupool_cpuremove_node(
        &self,
        ctx: *mut LibxlCtx,
        poolid: u32,
        node: c_int,
        cpus: *mut c_int,
    ) -> c_int;

    unsafe fn cpupool_movedomain(&self, ctx: *mut LibxlCtx, poolid: u32, domid: u32) -> c_int;
}
