//! Cpupools
//!
//! A cpupool is a set of physical CPUs with its own scheduler; every domain
//! runs in exactly one pool and a CPU belongs to at most one pool.

mod placement;


use std::ffi::{c_int, CString};

use serde::Serialize;
use uuid::Uuid;

use crate::{
    bitmap::Bitmap,
    codec::{string_from_ptr, take_list, FromLibxl, Scoped, ToLibxl},
    context::LibxlHandle,
    error::{Error, MarshalError, Result},
    ffi::{LibxlCpupoolinfo, LibxlUuid},
    libxl::Libxl,
    DomId, PoolId,
};

pub use placement::CpupoolPlacement;

libxl_enum! {
    /// `libxl_scheduler`
    Scheduler as "scheduler" {
        Unknown = 0 => "unknown",
        Sedf = 4 => "sedf",
        Credit = 5 => "credit",
        Credit2 = 6 => "credit2",
        Arinc653 = 7 => "arinc653",
        Rtds = 8 => "rtds",
        Null = 9 => "null",
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CpupoolInfo {
    pub poolid: PoolId,
    pub pool_name: String,
    pub scheduler: Scheduler,
    /// Number of domains in the pool.
    pub n_dom: u32,
    pub cpumap: Bitmap,
}

impl FromLibxl<LibxlCpupoolinfo> for CpupoolInfo {
    unsafe fn from_libxl(raw: &LibxlCpupoolinfo) -> std::result::Result<Self, MarshalError> {
        Ok(Self {
            poolid: PoolId(raw.poolid),
            pool_name: string_from_ptr(raw.pool_name).unwrap_or_default(),
            scheduler: Scheduler::from_raw(raw.sched),
            n_dom: raw.n_dom,
            cpumap: Bitmap::from_libxl(&raw.cpumap)?,
        })
    }
}

fn to_cstring(s: &str) -> Result<CString> {
    CString::new(s).map_err(|e| MarshalError::InteriorNul(e.nul_position()).into())
}

pub trait CpupoolControl {
    fn list_cpupools(&self) -> Result<Vec<CpupoolInfo>>;

    fn cpupool_info(&self, poolid: PoolId) -> Result<CpupoolInfo>;

    /// Create a pool over `cpumap`, with a fresh random UUID. Returns the id
    /// libxl picked for it.
    fn cpupool_create(&self, name: &str, scheduler: Scheduler, cpumap: &Bitmap)
        -> Result<PoolId>;

    /// Destroy an empty pool, its CPUs become free.
    fn cpupool_destroy(&self, poolid: PoolId) -> Result<()>;

    fn cpupool_rename(&self, poolid: PoolId, name: &str) -> Result<()>;

    fn cpupool_cpuadd(&self, poolid: PoolId, cpu: u32) -> Result<()>;

    fn cpupool_cpuadd_cpumap(&self, poolid: PoolId, cpumap: &Bitmap) -> Result<()>;

    /// Add every free CPU of a NUMA node. Returns how many were added.
    fn cpupool_cpuadd_node(&self, poolid: PoolId, node: u32) -> Result<u32>;

    fn cpupool_cpuremove(&self, poolid: PoolId, cpu: u32) -> Result<()>;

    fn cpupool_cpuremove_cpumap(&self, poolid: PoolId, cpumap: &Bitmap) -> Result<()>;

    /// Remove every CPU of a NUMA node. Returns how many were removed.
    fn cpupool_cpuremove_node(&self, poolid: PoolId, node: u32) -> Result<u32>;

    fn cpupool_movedomain(&self, poolid: PoolId, domid: DomId) -> Result<()>;
}

fn cpu_index(cpu: u32) -> Result<c_int> {
    c_int::try_from(cpu).map_err(|_| MarshalError::LengthOverflow(cpu as usize).into())
}

impl<H: LibxlHandle> CpupoolControl for H {
    fn list_cpupools(&self) -> Result<Vec<CpupoolInfo>> {
        let ctx = self.check_open()?;
        let lib = self.lib();
        let mut count = 0;

        tracing::debug!("libxl_list_cpupool");
        unsafe {
            let list = lib.list_cpupool(ctx, &mut count);
            take_list(list, count, |list, count| {
                lib.cpupoolinfo_list_free(list, count)
            })
        }
    }

    fn cpupool_info(&self, poolid: PoolId) -> Result<CpupoolInfo> {
        let ctx = self.check_open()?;
        let lib = self.lib();

        let mut raw = Scoped::new(LibxlCpupoolinfo::default(), |raw| unsafe {
            lib.cpupoolinfo_dispose(raw)
        });

        tracing::debug!("libxl_cpupool_info({poolid})");
        Error::check(unsafe { lib.cpupool_info(ctx, &mut *raw, poolid.0) })?;

        Ok(unsafe { CpupoolInfo::from_libxl(&raw)? })
    }

    fn cpupool_create(
        &self,
        name: &str,
        scheduler: Scheduler,
        cpumap: &Bitmap,
    ) -> Result<PoolId> {
        let ctx = self.check_open()?;

        let name = to_cstring(name)?;
        let cpumap = cpumap.to_libxl()?;
        let mut uuid = LibxlUuid {
            uuid: Uuid::new_v4().into_bytes(),
        };
        let mut poolid = PoolId::ANY.0;

        tracing::debug!("libxl_cpupool_create({name:?}, {scheduler})");
        // libxl copies the cpumap, `cpumap` still owns the buffer.
        Error::check(unsafe {
            self.lib().cpupool_create(
                ctx,
                name.as_ptr(),
                scheduler.as_raw(),
                *cpumap.as_raw(),
                &mut uuid,
                &mut poolid,
            )
        })?;

        Ok(PoolId(poolid))
    }

    fn cpupool_destroy(&self, poolid: PoolId) -> Result<()> {
        let ctx = self.check_open()?;

        tracing::debug!("libxl_cpupool_destroy({poolid})");
        Error::check(unsafe { self.lib().cpupool_destroy(ctx, poolid.0) })
    }

    fn cpupool_rename(&self, poolid: PoolId, name: &str) -> Result<()> {
        let ctx = self.check_open()?;
        let name = to_cstring(name)?;

        tracing::debug!("libxl_cpupool_rename({poolid}, {name:?})");
        Error::check(unsafe { self.lib().cpupool_rename(ctx, name.as_ptr(), poolid.0) })
    }

    fn cpupool_cpuadd(&self, poolid: PoolId, cpu: u32) -> Result<()> {
        let ctx = self.check_open()?;
        let cpu = cpu_index(cpu)?;

        tracing::debug!("libxl_cpupool_cpuadd({poolid}, {cpu})");
        Error::check(unsafe { self.lib().cpupool_cpuadd(ctx, poolid.0, cpu) })
    }

    fn cpupool_cpuadd_cpumap(&self, poolid: PoolId, cpumap: &Bitmap) -> Result<()> {
        let ctx = self.check_open()?;
        let raw = cpumap.to_libxl()?;

        tracing::debug!("libxl_cpupool_cpuadd_cpumap({poolid}, {cpumap})");
        Error::check(unsafe { self.lib().cpupool_cpuadd_cpumap(ctx, poolid.0, raw.as_ptr()) })
    }

    fn cpupool_cpuadd_node(&self, poolid: PoolId, node: u32) -> Result<u32> {
        let ctx = self.check_open()?;
        let node = cpu_index(node)?;
        let mut cpus = 0;

        tracing::debug!("libxl_cpupool_cpuadd_node({poolid}, {node})");
        Error::check(unsafe {
            self.lib()
                .cpupool_cpuadd_node(ctx, poolid.0, node, &mut cpus)
        })?;

        Ok(u32::try_from(cpus).map_err(|_| MarshalError::InvalidLength(cpus.into()))?)
    }

    fn cpupool_cpuremove(&self, poolid: PoolId, cpu: u32) -> Result<()> {
        let ctx = self.check_open()?;
        let cpu = cpu_index(cpu)?;

        tracing::debug!("libxl_cpupool_cpuremove({poolid}, {cpu})");
        Error::check(unsafe { self.lib().cpupool_cpuremove(ctx, poolid.0, cpu) })
    }

    fn cpupool_cpuremove_cpumap(&self, poolid: PoolId, cpumap: &Bitmap) -> Result<()> {
        let ctx = self.check_open()?;
        let raw = cpumap.to_libxl()?;

        tracing::debug!("libxl_cpupool_cpuremove_cpumap({poolid}, {cpumap})");
        Error::check(unsafe {
            self.lib()
                .cpupool_cpuremove_cpumap(ctx, poolid.0, raw.as_ptr())
        })
    }

    fn cpupool_cpuremove_node(&self, poolid: PoolId, node: u32) -> Result<u32> {
        let ctx = self.check_open()?;
        let node = cpu_index(node)?;
        let mut cpus = 0;

        tracing::debug!("libxl_cpupool_cpuremove_node({poolid}, {node})");
        Error::check(unsafe {
            self.lib()
                .cpupool_cpuremove_node(ctx, poolid.0, node, &mut cpus)
        })?;

        Ok(u32::try_from(cpus).map_err(|_| MarshalError::InvalidLength(cpus.into()))?)
    }

    fn cpupool_movedomain(&self, poolid: PoolId, domid: DomId) -> Result<()> {
        let ctx = self.check_open()?;

        tracing::debug!("libxl_cpupool_movedomain({poolid}, {domid})");
        Error::check(unsafe { self.lib().cpupool_movedomain(ctx, poolid.0, domid.0) })
    }
}
