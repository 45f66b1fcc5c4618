use crate::{
    bitmap::Bitmap,
    error::{Error, Result},
    host::HostInfo,
};

use super::{CpupoolControl, CpupoolInfo};

/// Placement helpers built on top of the cpupool primitives.
pub trait CpupoolPlacement {
    /// First pool whose name is exactly `name`.
    fn cpupool_find_by_name(&self, name: &str) -> Result<Option<CpupoolInfo>>;

    /// Take every CPU of `cpus` out of the pool holding it.
    ///
    /// Pools are handled one at a time and the first failure stops the whole
    /// operation with [`Error::Evacuation`]. CPUs already removed from earlier
    /// pools are not given back.
    fn cpupool_make_free(&self, cpus: &Bitmap) -> Result<()>;

    /// Host CPUs that belong to no pool.
    fn free_cpus(&self) -> Result<Bitmap>;
}

impl<T: CpupoolControl + HostInfo> CpupoolPlacement for T {
    fn cpupool_find_by_name(&self, name: &str) -> Result<Option<CpupoolInfo>> {
        Ok(self
            .list_cpupools()?
            .into_iter()
            .find(|pool| pool.pool_name == name))
    }

    fn cpupool_make_free(&self, cpus: &Bitmap) -> Result<()> {
        for pool in self.list_cpupools()? {
            let claimed = cpus & &pool.cpumap;

            if claimed.is_empty() {
                continue;
            }

            tracing::info!("Removing cpus {claimed} from cpupool {}", pool.poolid);

            if let Err(e) = self.cpupool_cpuremove_cpumap(pool.poolid, &claimed) {
                tracing::error!("Unable to remove cpus from cpupool {}: {e}", pool.poolid);

                return Err(Error::Evacuation {
                    poolid: pool.poolid,
                    source: Box::new(e),
                });
            }
        }

        Ok(())
    }

    fn free_cpus(&self) -> Result<Bitmap> {
        let max_cpu_id = self.physinfo()?.max_cpu_id as usize;
        let host: Bitmap = (0..=max_cpu_id).collect();

        Ok(self
            .list_cpupools()?
            .iter()
            .fold(host, |free, pool| free.difference(&pool.cpumap)))
    }
}
