//! Host-wide queries.

use std::ffi::c_char;

use bitflags::bitflags;
use serde::Serialize;

use crate::{
    codec::{string_from_ptr, FromLibxl, Hwcap, Scoped},
    context::LibxlHandle,
    error::{Error, LibxlError, MarshalError, Result},
    ffi::{LibxlPhysinfo, LibxlVersionInfo},
    libxl::Libxl,
    MemKb,
};

bitflags! {
  /// Virtualization capabilities of the host.
  #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
  pub struct PhysCaps: u32 {
    const HVM = 1 << 0;
    const PV = 1 << 1;
    const HVM_DIRECTIO = 1 << 2;
    const HAP = 1 << 3;
    const SHADOW = 1 << 4;
    const IOMMU_HAP_PT_SHARE = 1 << 5;
  }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Physinfo {
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
    pub hw_cap: Hwcap,
    pub caps: PhysCaps,
}

impl FromLibxl<LibxlPhysinfo> for Physinfo {
    unsafe fn from_libxl(raw: &LibxlPhysinfo) -> std::result::Result<Self, MarshalError> {
        let mut caps = PhysCaps::empty();
        caps.set(PhysCaps::HVM, raw.cap_hvm);
        caps.set(PhysCaps::PV, raw.cap_pv);
        caps.set(PhysCaps::HVM_DIRECTIO, raw.cap_hvm_directio);
        caps.set(PhysCaps::HAP, raw.cap_hap);
        caps.set(PhysCaps::SHADOW, raw.cap_shadow);
        caps.set(PhysCaps::IOMMU_HAP_PT_SHARE, raw.cap_iommu_hap_pt_share);

        Ok(Self {
            threads_per_core: raw.threads_per_core,
            cores_per_socket: raw.cores_per_socket,
            max_cpu_id: raw.max_cpu_id,
            nr_cpus: raw.nr_cpus,
            cpu_khz: raw.cpu_khz,
            total_pages: raw.total_pages,
            free_pages: raw.free_pages,
            scrub_pages: raw.scrub_pages,
            outstanding_pages: raw.outstanding_pages,
            sharing_freed_pages: raw.sharing_freed_pages,
            sharing_used_frames: raw.sharing_used_frames,
            max_possible_mfn: raw.max_possible_mfn,
            nr_nodes: raw.nr_nodes,
            hw_cap: Hwcap::from_libxl(&raw.hw_cap)?,
            caps,
        })
    }
}

/// Hypervisor build information. Missing strings are empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    pub xen_version_major: i32,
    pub xen_version_minor: i32,
    pub xen_version_extra: String,
    pub compiler: String,
    pub compile_by: String,
    pub compile_domain: String,
    pub compile_date: String,
    pub capabilities: String,
    pub changeset: String,
    pub virt_start: u64,
    pub pagesize: i32,
    pub commandline: String,
    pub build_id: String,
}

impl VersionInfo {
    /// `major.minor` followed by the extra version, e.g. `4.17.3-pre`.
    pub fn version(&self) -> String {
        format!(
            "{}.{}{}",
            self.xen_version_major, self.xen_version_minor, self.xen_version_extra
        )
    }
}

impl FromLibxl<LibxlVersionInfo> for VersionInfo {
    unsafe fn from_libxl(raw: &LibxlVersionInfo) -> std::result::Result<Self, MarshalError> {
        let string = |ptr: *mut c_char| string_from_ptr(ptr).unwrap_or_default();

        Ok(Self {
            xen_version_major: raw.xen_version_major,
            xen_version_minor: raw.xen_version_minor,
            xen_version_extra: string(raw.xen_version_extra),
            compiler: string(raw.compiler),
            compile_by: string(raw.compile_by),
            compile_domain: string(raw.compile_domain),
            compile_date: string(raw.compile_date),
            capabilities: string(raw.capabilities),
            changeset: string(raw.changeset),
            virt_start: raw.virt_start,
            pagesize: raw.pagesize,
            commandline: string(raw.commandline),
            build_id: string(raw.build_id),
        })
    }
}

pub trait HostInfo {
    fn physinfo(&self) -> Result<Physinfo>;

    fn version_info(&self) -> Result<VersionInfo>;

    /// Maximum number of CPUs the host supports.
    fn max_cpus(&self) -> Result<u32>;

    fn online_cpus(&self) -> Result<u32>;

    fn max_nodes(&self) -> Result<u32>;

    fn free_memory(&self) -> Result<MemKb>;
}

impl<H: LibxlHandle> HostInfo for H {
    fn physinfo(&self) -> Result<Physinfo> {
        let ctx = self.check_open()?;
        let lib = self.lib();

        let mut raw = Scoped::new(LibxlPhysinfo::default(), |raw| unsafe {
            lib.physinfo_dispose(raw)
        });

        tracing::debug!("libxl_get_physinfo");
        Error::check(unsafe { lib.get_physinfo(ctx, &mut *raw) })?;

        Ok(unsafe { Physinfo::from_libxl(&raw)? })
    }

    fn version_info(&self) -> Result<VersionInfo> {
        let ctx = self.check_open()?;

        tracing::debug!("libxl_get_version_info");
        // Cached by libxl in the context, not ours to free.
        let raw = unsafe { self.lib().get_version_info(ctx).as_ref() }.ok_or(LibxlError::Fail)?;

        Ok(unsafe { VersionInfo::from_libxl(raw)? })
    }

    fn max_cpus(&self) -> Result<u32> {
        let ctx = self.check_open()?;

        tracing::debug!("libxl_get_max_cpus");
        Error::check_count(unsafe { self.lib().get_max_cpus(ctx) })
    }

    fn online_cpus(&self) -> Result<u32> {
        let ctx = self.check_open()?;

        tracing::debug!("libxl_get_online_cpus");
        Error::check_count(unsafe { self.lib().get_online_cpus(ctx) })
    }

    fn max_nodes(&self) -> Result<u32> {
        let ctx = self.check_open()?;

        tracing::debug!("libxl_get_max_nodes");
        Error::check_count(unsafe { self.lib().get_max_nodes(ctx) })
    }

    fn free_memory(&self) -> Result<MemKb> {
        let ctx = self.check_open()?;
        let mut memkb = 0;

        tracing::debug!("libxl_get_free_memory");
        Error::check(unsafe { self.lib().get_free_memory(ctx, &mut memkb) })?;

        Ok(MemKb(memkb))
    }
}
