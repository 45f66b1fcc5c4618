//! Raw libxl structures, as laid out by `libxl_types.idl` of Xen 4.14.
//!
//! Later releases add fields to `libxl_physinfo` and `libxl_dominfo`, so
//! these layouts are only valid against libxl 4.14.
//!
//! Nothing in here owns memory. Pointers are either owned by libxl (and
//! released through the matching `*_dispose`/`*_list_free` entry point) or by
//! an encoder in [`crate::codec`].

use std::ffi::{c_char, c_int};

/// `LIBXL_VERSION` passed to `libxl_ctx_alloc`.
pub const LIBXL_VERSION: c_int = 0;

/// Xen `(major, minor)` release the layouts below belong to.
pub const SUPPORTED_XEN_VERSION: (c_int, c_int) = (4, 14);

pub const LIBXL_CPUPOOL_POOLID_ANY: u32 = 0xFFFF_FFFF;

pub const LIBXL_MS_VM_GENID_LEN: usize = 16;

/// Opaque `libxl_ctx`.
#[repr(C)]
pub struct LibxlCtx {
    _private: [u8; 0],
}

/// Opaque `xentoollog_logger`.
#[repr(C)]
pub struct XentoollogLogger {
    _private: [u8; 0],
}

/// Opaque `libxl_asyncop_how`. Only ever passed as null.
#[repr(C)]
pub struct LibxlAsyncopHow {
    _private: [u8; 0],
}

/// Opaque `struct xc_xend_cpuid`, behind `libxl_cpuid_policy_list`.
#[repr(C)]
pub struct LibxlCpuidPolicy {
    _private: [u8; 0],
}

pub type LibxlCpuidPolicyList = *mut LibxlCpuidPolicy;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LibxlUuid {
    pub uuid: [u8; 16],
}

pub type LibxlMac = [u8; 6];

pub type LibxlHwcap = [u32; 8];

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LibxlMsVmGenid {
    pub bytes: [u8; LIBXL_MS_VM_GENID_LEN],
}

/// `libxl_defbool`: 0 is default, negative false, positive true.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LibxlDefbool {
    pub val: c_int,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct LibxlBitmap {
    /// Number of bytes in `map`.
    pub size: u32,
    pub map: *mut u8,
}

impl Default for LibxlBitmap {
    fn default() -> Self {
        Self {
            size: 0,
            map: std::ptr::null_mut(),
        }
    }
}

/// `libxl_string_list`: NULL-terminated array of C strings.
#[repr(transparent)]
#[derive(Clone, Copy, Debug)]
pub struct LibxlStringList(pub *mut *mut c_char);

/// `libxl_key_value_list`: NULL-terminated array of key, value, key, value...
#[repr(transparent)]
#[derive(Clone, Copy, Debug)]
pub struct LibxlKeyValueList(pub *mut *mut c_char);

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct LibxlDominfo {
    pub uuid: LibxlUuid,
    pub domid: u32,
    pub ssidref: u32,
    pub ssid_label: *mut c_char,
    pub running: bool,
    pub blocked: bool,
    pub paused: bool,
    pub shutdown: bool,
    pub dying: bool,
    pub never_stop: bool,
    /// `libxl_shutdown_reason`
    pub shutdown_reason: c_int,
    pub outstanding_memkb: u64,
    pub current_memkb: u64,
    pub shared_memkb: u64,
    pub paged_memkb: u64,
    pub max_memkb: u64,
    /// Nanoseconds.
    pub cpu_time: u64,
    pub vcpu_max_id: u32,
    pub vcpu_online: u32,
    pub cpupool: u32,
    /// `libxl_domain_type`
    pub domain_type: c_int,
}

impl Default for LibxlDominfo {
    fn default() -> Self {
        // SAFETY: all-zero is the state `libxl_dominfo_init` leaves behind.
        unsafe { std::mem::zeroed() }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct LibxlVcpuinfo {
    pub vcpuid: u32,
    /// Current mapping.
    pub cpu: u32,
    pub online: bool,
    pub blocked: bool,
    pub running: bool,
    /// Total vcpu time ran (ns).
    pub vcpu_time: u64,
    /// Current hard cpu affinity.
    pub cpumap: LibxlBitmap,
    /// Current soft cpu affinity.
    pub cpumap_soft: LibxlBitmap,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct LibxlPhysinfo {
    pub threads_per_core: u32,
    pub cores_per_socket: u32,
    pub max_cpu_id: u32,
    pub nr_cpus: u32,
    pub cpu_khz: u32,
    pub total_pages: u64,
    pub free_pages: u64,
    pub scrub_pages: u64,
    pub outstanding_pages: u64,
    pub sharing_freed_pages: u64,
    pub sharing_used_frames: u64,
    pub max_possible_mfn: u64,
    pub nr_nodes: u32,
    pub hw_cap: LibxlHwcap,
    pub cap_hvm: bool,
    pub cap_pv: bool,
    pub cap_hvm_directio: bool,
    pub cap_hap: bool,
    pub cap_shadow: bool,
    pub cap_iommu_hap_pt_share: bool,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct LibxlVersionInfo {
    pub xen_version_major: c_int,
    pub xen_version_minor: c_int,
    pub xen_version_extra: *mut c_char,
    pub compiler: *mut c_char,
    pub compile_by: *mut c_char,
    pub compile_domain: *mut c_char,
    pub compile_date: *mut c_char,
    pub capabilities: *mut c_char,
    pub changeset: *mut c_char,
    pub virt_start: u64,
    pub pagesize: c_int,
    pub commandline: *mut c_char,
    pub build_id: *mut c_char,
}

impl Default for LibxlVersionInfo {
    fn default() -> Self {
        // SAFETY: integers and null pointers.
        unsafe { std::mem::zeroed() }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct LibxlCpupoolinfo {
    pub poolid: u32,
    pub pool_name: *mut c_char,
    /// `libxl_scheduler`
    pub sched: c_int,
    pub n_dom: u32,
    pub cpumap: LibxlBitmap,
}

impl Default for LibxlCpupoolinfo {
    fn default() -> Self {
        // SAFETY: integers and null pointers.
        unsafe { std::mem::zeroed() }
    }
}

/// `xentoollog_level`
pub type XentoollogLevel = c_int;

pub const XTL_NONE: XentoollogLevel = 0;
pub const XTL_DEBUG: XentoollogLevel = 1;
pub const XTL_VERBOSE: XentoollogLevel = 2;
pub const XTL_DETAIL: XentoollogLevel = 3;
pub const XTL_PROGRESS: XentoollogLevel = 4;
pub const XTL_INFO: XentoollogLevel = 5;
pub const XTL_NOTICE: XentoollogLevel = 6;
pub const XTL_WARN: XentoollogLevel = 7;
pub const XTL_ERROR: XentoollogLevel = 8;
pub const XTL_CRITICAL: XentoollogLevel = 9;
