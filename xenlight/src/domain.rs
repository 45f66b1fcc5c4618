//! Domain queries and actions.
//!
//! Actions complete synchronously: the asynchronous operation descriptor libxl
//! accepts is always null, so each call returns once libxl is done.

use std::{
    ffi::{c_char, c_int},
    ptr,
    time::Duration,
};

use bitflags::bitflags;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    bitmap::Bitmap,
    codec::{free, string_from_ptr, take_list, FromLibxl, Scoped},
    context::LibxlHandle,
    error::{Error, LibxlError, MarshalError, Result},
    ffi::{LibxlAsyncopHow, LibxlCtx, LibxlDominfo, LibxlVcpuinfo},
    libxl::Libxl,
    DomId, MemKb, PoolId,
};

libxl_enum! {
    /// `libxl_domain_type`
    DomainType as "domain type" {
        Invalid = -1 => "invalid",
        Hvm = 1 => "hvm",
        Pv = 2 => "pv",
        Pvh = 3 => "pvh",
    }
}

libxl_enum! {
    /// `libxl_shutdown_reason`
    ShutdownReason as "shutdown reason" {
        Unknown = -1 => "unknown",
        Poweroff = 0 => "poweroff",
        Reboot = 1 => "reboot",
        Suspend = 2 => "suspend",
        Crash = 3 => "crash",
        Watchdog = 4 => "watchdog",
        SoftReset = 5 => "soft_reset",
    }
}

libxl_enum! {
    /// `libxl_console_type`
    ConsoleType as "console type" {
        Unknown = 0 => "unknown",
        Serial = 1 => "serial",
        Pv = 2 => "pv",
        Vuart = 3 => "vuart",
    }
}

bitflags! {
  /// Run state of a domain.
  #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
  pub struct DomainFlags: u8 {
    const RUNNING = 1 << 0;
    const BLOCKED = 1 << 1;
    const PAUSED = 1 << 2;
    const SHUTDOWN = 1 << 3;
    const DYING = 1 << 4;
    /// Domain must never be stopped (e.g. dom0).
    const NEVER_STOP = 1 << 5;
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Dominfo {
    pub uuid: Uuid,
    pub domid: DomId,
    pub ssidref: u32,
    pub ssid_label: Option<String>,
    pub flags: DomainFlags,
    /// Only meaningful when [`DomainFlags::SHUTDOWN`] is set.
    pub shutdown_reason: ShutdownReason,
    pub outstanding_memkb: MemKb,
    pub current_memkb: MemKb,
    pub shared_memkb: MemKb,
    pub paged_memkb: MemKb,
    pub max_memkb: MemKb,
    pub cpu_time: Duration,
    pub vcpu_max_id: u32,
    pub vcpu_online: u32,
    pub cpupool: PoolId,
    pub domain_type: DomainType,
}

impl FromLibxl<LibxlDominfo> for Dominfo {
    unsafe fn from_libxl(raw: &LibxlDominfo) -> std::result::Result<Self, MarshalError> {
        let mut flags = DomainFlags::empty();
        flags.set(DomainFlags::RUNNING, raw.running);
        flags.set(DomainFlags::BLOCKED, raw.blocked);
        flags.set(DomainFlags::PAUSED, raw.paused);
        flags.set(DomainFlags::SHUTDOWN, raw.shutdown);
        flags.set(DomainFlags::DYING, raw.dying);
        flags.set(DomainFlags::NEVER_STOP, raw.never_stop);

        Ok(Self {
            uuid: Uuid::from_libxl(&raw.uuid)?,
            domid: DomId(raw.domid),
            ssidref: raw.ssidref,
            ssid_label: string_from_ptr(raw.ssid_label),
            flags,
            shutdown_reason: ShutdownReason::from_raw(raw.shutdown_reason),
            outstanding_memkb: MemKb(raw.outstanding_memkb),
            current_memkb: MemKb(raw.current_memkb),
            shared_memkb: MemKb(raw.shared_memkb),
            paged_memkb: MemKb(raw.paged_memkb),
            max_memkb: MemKb(raw.max_memkb),
            cpu_time: Duration::from_nanos(raw.cpu_time),
            vcpu_max_id: raw.vcpu_max_id,
            vcpu_online: raw.vcpu_online,
            cpupool: PoolId(raw.cpupool),
            domain_type: DomainType::from_raw(raw.domain_type),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Vcpuinfo {
    pub vcpuid: u32,
    /// Physical CPU currently running this vCPU.
    pub cpu: u32,
    pub online: bool,
    pub blocked: bool,
    pub running: bool,
    pub vcpu_time: Duration,
    /// Hard affinity.
    pub cpumap: Bitmap,
    /// Soft affinity.
    pub cpumap_soft: Bitmap,
}

impl FromLibxl<LibxlVcpuinfo> for Vcpuinfo {
    unsafe fn from_libxl(raw: &LibxlVcpuinfo) -> std::result::Result<Self, MarshalError> {
        Ok(Self {
            vcpuid: raw.vcpuid,
            cpu: raw.cpu,
            online: raw.online,
            blocked: raw.blocked,
            running: raw.running,
            vcpu_time: Duration::from_nanos(raw.vcpu_time),
            cpumap: Bitmap::from_libxl(&raw.cpumap)?,
            cpumap_soft: Bitmap::from_libxl(&raw.cpumap_soft)?,
        })
    }
}

pub trait DomainControl {
    fn list_domains(&self) -> Result<Vec<Dominfo>>;

    fn domain_info(&self, domid: DomId) -> Result<Dominfo>;

    fn list_vcpus(&self, domid: DomId) -> Result<Vec<Vcpuinfo>>;

    fn domain_pause(&self, domid: DomId) -> Result<()>;

    fn domain_unpause(&self, domid: DomId) -> Result<()>;

    /// Ask the guest to shut down. Returns once the request is delivered.
    fn domain_shutdown(&self, domid: DomId) -> Result<()>;

    fn domain_reboot(&self, domid: DomId) -> Result<()>;

    fn domain_destroy(&self, domid: DomId) -> Result<()>;

    /// Path of the tty backing console `cons_num` of the given type.
    fn console_get_tty(&self, domid: DomId, cons_num: i32, kind: ConsoleType) -> Result<String>;

    /// Path of the tty backing the domain's primary console.
    fn primary_console_get_tty(&self, domid: DomId) -> Result<String>;
}

type AsyncAction<L> = unsafe fn(&L, *mut LibxlCtx, u32, *const LibxlAsyncopHow) -> c_int;

fn domain_action<H: LibxlHandle>(
    handle: &H,
    name: &str,
    domid: DomId,
    action: AsyncAction<H::Lib>,
) -> Result<()> {
    let ctx = handle.check_open()?;

    tracing::debug!("{name}({domid})");
    Error::check(unsafe { action(handle.lib(), ctx, domid.0, ptr::null()) })
}

/// Take ownership of a `malloc`ed tty path filled by `fetch`.
fn tty_path(fetch: impl FnOnce(*mut *mut c_char) -> c_int) -> Result<String> {
    let mut path = Scoped::new(ptr::null_mut(), |path: &mut *mut c_char| unsafe { free(*path) });

    Error::check(fetch(&mut *path))?;

    unsafe { string_from_ptr(*path) }.ok_or(LibxlError::Fail.into())
}

impl<H: LibxlHandle> DomainControl for H {
    fn list_domains(&self) -> Result<Vec<Dominfo>> {
        let ctx = self.check_open()?;
        let lib = self.lib();
        let mut count = 0;

        tracing::debug!("libxl_list_domain");
        unsafe {
            let list = lib.list_domain(ctx, &mut count);
            take_list(list, count, |list, count| lib.dominfo_list_free(list, count))
        }
    }

    fn domain_info(&self, domid: DomId) -> Result<Dominfo> {
        let ctx = self.check_open()?;
        let lib = self.lib();

        let mut raw = Scoped::new(LibxlDominfo::default(), |raw| unsafe {
            lib.dominfo_dispose(raw)
        });

        tracing::debug!("libxl_domain_info({domid})");
        Error::check(unsafe { lib.domain_info(ctx, &mut *raw, domid.0) })?;

        Ok(unsafe { Dominfo::from_libxl(&raw)? })
    }

    fn list_vcpus(&self, domid: DomId) -> Result<Vec<Vcpuinfo>> {
        let ctx = self.check_open()?;
        let lib = self.lib();
        let (mut count, mut nr_cpus) = (0, 0);

        tracing::debug!("libxl_list_vcpu({domid})");
        unsafe {
            let list = lib.list_vcpu(ctx, domid.0, &mut count, &mut nr_cpus);
            take_list(list, count, |list, count| lib.vcpuinfo_list_free(list, count))
        }
    }

    fn domain_pause(&self, domid: DomId) -> Result<()> {
        domain_action(
            self,
            "libxl_domain_pause",
            domid,
            <H::Lib as Libxl>::domain_pause,
        )
    }

    fn domain_unpause(&self, domid: DomId) -> Result<()> {
        domain_action(
            self,
            "libxl_domain_unpause",
            domid,
            <H::Lib as Libxl>::domain_unpause,
        )
    }

    fn domain_shutdown(&self, domid: DomId) -> Result<()> {
        domain_action(
            self,
            "libxl_domain_shutdown",
            domid,
            <H::Lib as Libxl>::domain_shutdown,
        )
    }

    fn domain_reboot(&self, domid: DomId) -> Result<()> {
        domain_action(
            self,
            "libxl_domain_reboot",
            domid,
            <H::Lib as Libxl>::domain_reboot,
        )
    }

    fn domain_destroy(&self, domid: DomId) -> Result<()> {
        domain_action(
            self,
            "libxl_domain_destroy",
            domid,
            <H::Lib as Libxl>::domain_destroy,
        )
    }

    fn console_get_tty(&self, domid: DomId, cons_num: i32, kind: ConsoleType) -> Result<String> {
        let ctx = self.check_open()?;

        tracing::debug!("libxl_console_get_tty({domid}, {cons_num}, {kind})");
        tty_path(|path| unsafe {
            self.lib()
                .console_get_tty(ctx, domid.0, cons_num, kind.as_raw(), path)
        })
    }

    fn primary_console_get_tty(&self, domid: DomId) -> Result<String> {
        let ctx = self.check_open()?;

        tracing::debug!("libxl_primary_console_get_tty({domid})");
        tty_path(|path| unsafe { self.lib().primary_console_get_tty(ctx, domid.0, path) })
    }
}
