//! A fake libxl.
//!
//! Keeps a small host model (pools, domains) and hands out structures
//! allocated with the C allocator, the way libxl does. Every allocation is
//! tracked until it goes back through one of the release entry points, so
//! tests can check nothing leaks. Every entry point is recorded.
use std::{
    cell::{Cell, RefCell},
    collections::HashSet,
    ffi::{c_char, c_int, c_uint, CStr, CString},
    ptr,
};

use nix::libc;

use crate::{
    bitmap::Bitmap,
    codec::{alloc_zeroed, FromLibxl},
    cpupool::Scheduler,
    domain::{DomainType, ShutdownReason},
    ffi::{
        LibxlAsyncopHow, LibxlBitmap, LibxlCpupoolinfo, LibxlCtx, LibxlDominfo, LibxlPhysinfo,
        LibxlUuid, LibxlVcpuinfo, LibxlVersionInfo, XentoollogLevel, XentoollogLogger,
        LIBXL_CPUPOOL_POOLID_ANY,
    },
    libxl::Libxl,
    LibxlError,
};

/// CPUs per NUMA node in the fake topology.
pub const CPUS_PER_NODE: usize = 4;

#[derive(Clone, Debug)]
pub struct MockPool {
    pub poolid: u32,
    pub name: String,
    pub scheduler: Scheduler,
    pub cpus: Bitmap,
    pub uuid: [u8; 16],
}

#[derive(Clone, Debug)]
pub struct MockDomain {
    pub domid: u32,
    pub cpupool: u32,
    pub paused: bool,
    pub shutdown: bool,
    pub ssid_label: Option<String>,
    pub vcpus: Vec<Bitmap>,
}

pub struct MockLibxl {
    pub pools: RefCell<Vec<MockPool>>,
    pub domains: RefCell<Vec<MockDomain>>,
    pub max_cpu_id: u32,

    /// Pool on which cpu removals fail.
    pub fail_remove: Cell<Option<u32>>,
    /// Make listing calls return a null list.
    pub fail_list: Cell<bool>,
    /// Make `libxl_ctx_free` report a failure.
    pub fail_ctx_free: Cell<bool>,
    /// Make `libxl_ctx_alloc` fail.
    pub fail_ctx_alloc: Cell<bool>,

    calls: RefCell<Vec<&'static str>>,
    live: RefCell<HashSet<usize>>,
    /// What `libxl_get_version_info` reports.
    pub version: LibxlVersionInfo,
}

impl Default for MockLibxl {
    fn default() -> Self {
        let version = LibxlVersionInfo {
            xen_version_major: 4,
            xen_version_minor: 14,
            xen_version_extra: c".3".as_ptr().cast_mut(),
            compiler: c"gcc".as_ptr().cast_mut(),
            capabilities: c"xen-3.0-x86_64 hvm-3.0-x86_64".as_ptr().cast_mut(),
            pagesize: 4096,
            ..Default::default()
        };

        Self {
            pools: RefCell::new(vec![MockPool {
                poolid: 0,
                name: "Pool-0".into(),
                scheduler: Scheduler::Credit2,
                cpus: (0..8).collect(),
                uuid: [0; 16],
            }]),
            domains: RefCell::new(vec![MockDomain {
                domid: 0,
                cpupool: 0,
                paused: false,
                shutdown: false,
                ssid_label: Some("system_u:system_r:dom0_t".into()),
                vcpus: vec![(0..8).collect(), (0..8).collect()],
            }]),
            max_cpu_id: 15,
            fail_remove: Cell::new(None),
            fail_list: Cell::new(false),
            fail_ctx_free: Cell::new(false),
            fail_ctx_alloc: Cell::new(false),
            calls: RefCell::default(),
            live: RefCell::default(),
            version,
        }
    }
}

impl MockLibxl {
    /// Host with the given pools (name, cpus) and only dom0 in the first one.
    pub fn with_pools(pools: &[(&str, &str)]) -> Self {
        let mock = Self::default();

        *mock.pools.borrow_mut() = pools
            .iter()
            .enumerate()
            .map(|(i, (name, cpus))| MockPool {
                poolid: i as u32,
                name: name.to_string(),
                scheduler: Scheduler::Credit,
                cpus: cpus.parse().expect("invalid cpus"),
                uuid: [0; 16],
            })
            .collect();

        mock
    }

    /// Entry points called so far.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    /// Allocations handed out and not released yet.
    pub fn outstanding(&self) -> usize {
        self.live.borrow().len()
    }

    pub fn pool(&self, name: &str) -> Option<MockPool> {
        self.pools
            .borrow()
            .iter()
            .find(|pool| pool.name == name)
            .cloned()
    }

    fn record(&self, name: &'static str) {
        self.calls.borrow_mut().push(name);
    }

    fn alloc<T>(&self, n: usize) -> *mut T {
        let ptr = alloc_zeroed::<T>(n).expect("allocation failure");
        self.live.borrow_mut().insert(ptr as usize);
        ptr
    }

    unsafe fn release<T>(&self, ptr: *mut T) {
        if ptr.is_null() {
            return;
        }

        assert!(
            self.live.borrow_mut().remove(&(ptr as usize)),
            "release of unknown pointer {ptr:?}"
        );
        libc::free(ptr.cast());
    }

    fn strdup(&self, s: &str) -> *mut c_char {
        let s = CString::new(s).expect("interior nul");
        let ptr = self.alloc::<c_char>(s.as_bytes_with_nul().len());

        // SAFETY: Allocated just above with the right size.
        unsafe { ptr::copy_nonoverlapping(s.as_ptr(), ptr, s.as_bytes_with_nul().len()) };
        ptr
    }

    fn bitmap(&self, bitmap: &Bitmap) -> LibxlBitmap {
        let bytes = bitmap.as_bytes();

        if bytes.is_empty() {
            return LibxlBitmap::default();
        }

        let map = self.alloc::<u8>(bytes.len());
        // SAFETY: Same as above.
        unsafe { ptr::copy_nonoverlapping(bytes.as_ptr(), map, bytes.len()) };

        LibxlBitmap {
            size: bytes.len() as u32,
            map,
        }
    }

    fn raw_pool(&self, pool: &MockPool) -> LibxlCpupoolinfo {
        let n_dom = self
            .domains
            .borrow()
            .iter()
            .filter(|domain| domain.cpupool == pool.poolid)
            .count();

        LibxlCpupoolinfo {
            poolid: pool.poolid,
            pool_name: self.strdup(&pool.name),
            sched: pool.scheduler.as_raw(),
            n_dom: n_dom as u32,
            cpumap: self.bitmap(&pool.cpus),
        }
    }

    fn raw_domain(&self, domain: &MockDomain) -> LibxlDominfo {
        let mut uuid = LibxlUuid::default();
        uuid.uuid[15] = domain.domid as u8;

        LibxlDominfo {
            uuid,
            domid: domain.domid,
            ssid_label: domain
                .ssid_label
                .as_deref()
                .map_or(ptr::null_mut(), |label| self.strdup(label)),
            running: !domain.paused && !domain.shutdown,
            paused: domain.paused,
            shutdown: domain.shutdown,
            never_stop: domain.domid == 0,
            shutdown_reason: if domain.shutdown {
                ShutdownReason::Poweroff.as_raw()
            } else {
                ShutdownReason::Unknown.as_raw()
            },
            current_memkb: 4 << 20,
            max_memkb: 8 << 20,
            cpu_time: 1_500_000_000,
            vcpu_max_id: domain.vcpus.len().saturating_sub(1) as u32,
            vcpu_online: domain.vcpus.len() as u32,
            cpupool: domain.cpupool,
            domain_type: if domain.domid == 0 {
                DomainType::Pv.as_raw()
            } else {
                DomainType::Hvm.as_raw()
            },
            ..Default::default()
        }
    }

    unsafe fn dispose_pool(&self, info: *mut LibxlCpupoolinfo) {
        self.release((*info).pool_name);
        self.release((*info).cpumap.map);
        *info = LibxlCpupoolinfo::default();
    }

    unsafe fn dispose_domain(&self, info: *mut LibxlDominfo) {
        self.release((*info).ssid_label);
        (*info).ssid_label = ptr::null_mut();
    }

    /// Run `f` on the pool `poolid`, or fail with `ERROR_INVAL`.
    fn with_pool(&self, poolid: u32, f: impl FnOnce(&mut MockPool) -> c_int) -> c_int {
        self.pools
            .borrow_mut()
            .iter_mut()
            .find(|pool| pool.poolid == poolid)
            .map_or(LibxlError::Inval.code(), f)
    }

    fn with_domain(&self, domid: u32, f: impl FnOnce(&mut MockDomain) -> c_int) -> c_int {
        self.domains
            .borrow_mut()
            .iter_mut()
            .find(|domain| domain.domid == domid)
            .map_or(LibxlError::DomainNotfound.code(), f)
    }

    fn assigned(&self) -> Bitmap {
        self.pools
            .borrow()
            .iter()
            .fold(Bitmap::new(), |all, pool| &all | &pool.cpus)
    }

    fn node_cpus(&self, node: c_int) -> Bitmap {
        let first = node as usize * CPUS_PER_NODE;
        (first..first + CPUS_PER_NODE)
            .filter(|&cpu| cpu <= self.max_cpu_id as usize)
            .collect()
    }

    fn remove_cpus(&self, poolid: u32, cpus: &Bitmap) -> c_int {
        if self.fail_remove.get() == Some(poolid) {
            return LibxlError::Fail.code();
        }

        self.with_pool(poolid, |pool| {
            pool.cpus = pool.cpus.difference(cpus);
            0
        })
    }

    fn add_cpus(&self, poolid: u32, cpus: &Bitmap) -> c_int {
        if !(cpus & &self.assigned()).is_empty() {
            return LibxlError::Inval.code();
        }

        self.with_pool(poolid, |pool| {
            pool.cpus = &pool.cpus | cpus;
            0
        })
    }
}

impl Libxl for MockLibxl {
    unsafe fn logger_create(&self, _: XentoollogLevel, _: c_uint) -> *mut XentoollogLogger {
        self.record("xtl_createlogger_stdiostream");
        self.alloc(1)
    }

    unsafe fn logger_destroy(&self, logger: *mut XentoollogLogger) {
        self.record("xtl_logger_destroy");
        self.release(logger)
    }

    unsafe fn ctx_alloc(
        &self,
        pctx: *mut *mut LibxlCtx,
        _: c_int,
        _: c_uint,
        logger: *mut XentoollogLogger,
    ) -> c_int {
        self.record("libxl_ctx_alloc");
        assert!(!logger.is_null());

        if self.fail_ctx_alloc.get() {
            return LibxlError::Nomem.code();
        }

        *pctx = self.alloc(1);
        0
    }

    unsafe fn ctx_free(&self, ctx: *mut LibxlCtx) -> c_int {
        self.record("libxl_ctx_free");
        self.release(ctx);

        if self.fail_ctx_free.get() {
            LibxlError::Fail.code()
        } else {
            0
        }
    }

    unsafe fn get_physinfo(&self, _: *mut LibxlCtx, physinfo: *mut LibxlPhysinfo) -> c_int {
        self.record("libxl_get_physinfo");

        *physinfo = LibxlPhysinfo {
            threads_per_core: 2,
            cores_per_socket: 4,
            max_cpu_id: self.max_cpu_id,
            nr_cpus: self.max_cpu_id + 1,
            cpu_khz: 2_400_000,
            total_pages: 1 << 22,
            free_pages: 1 << 20,
            nr_nodes: (self.max_cpu_id + 1) / CPUS_PER_NODE as u32,
            hw_cap: [0xbfeb_fbff, 0, 0, 0, 0, 0, 0, 0],
            cap_hvm: true,
            cap_hap: true,
            cap_shadow: true,
            ..Default::default()
        };
        0
    }

    unsafe fn physinfo_dispose(&self, _: *mut LibxlPhysinfo) {
        self.record("libxl_physinfo_dispose");
    }

    unsafe fn get_version_info(&self, _: *mut LibxlCtx) -> *const LibxlVersionInfo {
        self.record("libxl_get_version_info");
        &self.version
    }

    unsafe fn get_max_cpus(&self, _: *mut LibxlCtx) -> c_int {
        self.record("libxl_get_max_cpus");
        self.max_cpu_id as c_int + 1
    }

    unsafe fn get_online_cpus(&self, _: *mut LibxlCtx) -> c_int {
        self.record("libxl_get_online_cpus");
        self.max_cpu_id as c_int + 1
    }

    unsafe fn get_max_nodes(&self, _: *mut LibxlCtx) -> c_int {
        self.record("libxl_get_max_nodes");
        LibxlError::Fail.code()
    }

    unsafe fn get_free_memory(&self, _: *mut LibxlCtx, memkb: *mut u64) -> c_int {
        self.record("libxl_get_free_memory");
        *memkb = 4 << 20;
        0
    }

    unsafe fn list_domain(&self, _: *mut LibxlCtx, nb_domain: *mut c_int) -> *mut LibxlDominfo {
        self.record("libxl_list_domain");

        if self.fail_list.get() {
            *nb_domain = 0;
            return ptr::null_mut();
        }

        let domains = self.domains.borrow();
        let list = self.alloc::<LibxlDominfo>(domains.len());

        for (i, domain) in domains.iter().enumerate() {
            *list.add(i) = self.raw_domain(domain);
        }

        *nb_domain = domains.len() as c_int;
        list
    }

    unsafe fn dominfo_list_free(&self, list: *mut LibxlDominfo, nb_domain: c_int) {
        self.record("libxl_dominfo_list_free");

        for i in 0..nb_domain.max(0) as usize {
            self.dispose_domain(list.add(i));
        }
        self.release(list);
    }

    unsafe fn domain_info(&self, _: *mut LibxlCtx, info: *mut LibxlDominfo, domid: u32) -> c_int {
        self.record("libxl_domain_info");

        let domains = self.domains.borrow();
        match domains.iter().find(|domain| domain.domid == domid) {
            Some(domain) => {
                *info = self.raw_domain(domain);
                0
            }
            None => LibxlError::DomainNotfound.code(),
        }
    }

    unsafe fn dominfo_dispose(&self, info: *mut LibxlDominfo) {
        self.record("libxl_dominfo_dispose");
        self.dispose_domain(info);
    }

    unsafe fn list_vcpu(
        &self,
        _: *mut LibxlCtx,
        domid: u32,
        nb_vcpu: *mut c_int,
        nr_cpus: *mut c_int,
    ) -> *mut LibxlVcpuinfo {
        self.record("libxl_list_vcpu");

        let domains = self.domains.borrow();
        let Some(domain) = domains.iter().find(|domain| domain.domid == domid) else {
            *nb_vcpu = 0;
            return ptr::null_mut();
        };

        let list = self.alloc::<LibxlVcpuinfo>(domain.vcpus.len());

        for (i, affinity) in domain.vcpus.iter().enumerate() {
            *list.add(i) = LibxlVcpuinfo {
                vcpuid: i as u32,
                cpu: affinity.iter().next().unwrap_or(0) as u32,
                online: true,
                running: !domain.paused,
                vcpu_time: 1_000_000 * (i as u64 + 1),
                cpumap: self.bitmap(affinity),
                cpumap_soft: self.bitmap(&(0..=self.max_cpu_id as usize).collect()),
                ..Default::default()
            };
        }

        *nb_vcpu = domain.vcpus.len() as c_int;
        *nr_cpus = self.max_cpu_id as c_int + 1;
        list
    }

    unsafe fn vcpuinfo_list_free(&self, list: *mut LibxlVcpuinfo, nb_vcpu: c_int) {
        self.record("libxl_vcpuinfo_list_free");

        for i in 0..nb_vcpu.max(0) as usize {
            let info = &mut *list.add(i);
            self.release(info.cpumap.map);
            self.release(info.cpumap_soft.map);
        }
        self.release(list);
    }

    unsafe fn domain_pause(
        &self,
        _: *mut LibxlCtx,
        domid: u32,
        ao_how: *const LibxlAsyncopHow,
    ) -> c_int {
        self.record("libxl_domain_pause");
        assert!(ao_how.is_null());

        self.with_domain(domid, |domain| {
            domain.paused = true;
            0
        })
    }

    unsafe fn domain_unpause(
        &self,
        _: *mut LibxlCtx,
        domid: u32,
        ao_how: *const LibxlAsyncopHow,
    ) -> c_int {
        self.record("libxl_domain_unpause");
        assert!(ao_how.is_null());

        self.with_domain(domid, |domain| {
            domain.paused = false;
            0
        })
    }

    unsafe fn domain_shutdown(
        &self,
        _: *mut LibxlCtx,
        domid: u32,
        ao_how: *const LibxlAsyncopHow,
    ) -> c_int {
        self.record("libxl_domain_shutdown");
        assert!(ao_how.is_null());

        self.with_domain(domid, |domain| {
            domain.shutdown = true;
            0
        })
    }

    unsafe fn domain_reboot(
        &self,
        _: *mut LibxlCtx,
        domid: u32,
        ao_how: *const LibxlAsyncopHow,
    ) -> c_int {
        self.record("libxl_domain_reboot");
        assert!(ao_how.is_null());

        self.with_domain(domid, |domain| {
            domain.shutdown = false;
            domain.paused = false;
            0
        })
    }

    unsafe fn domain_destroy(
        &self,
        _: *mut LibxlCtx,
        domid: u32,
        ao_how: *const LibxlAsyncopHow,
    ) -> c_int {
        self.record("libxl_domain_destroy");
        assert!(ao_how.is_null());

        let mut domains = self.domains.borrow_mut();
        match domains.iter().position(|domain| domain.domid == domid) {
            Some(index) => {
                domains.remove(index);
                0
            }
            None => LibxlError::DomainNotfound.code(),
        }
    }

    unsafe fn console_get_tty(
        &self,
        _: *mut LibxlCtx,
        domid: u32,
        cons_num: c_int,
        console_type: c_int,
        path: *mut *mut c_char,
    ) -> c_int {
        self.record("libxl_console_get_tty");

        if cons_num != 0 || console_type == 0 {
            return LibxlError::Inval.code();
        }

        // Caller-owned, released with free().
        let tty = format!("/dev/pts/{domid}\0");
        *path = libc::strdup(tty.as_ptr().cast());
        0
    }

    unsafe fn primary_console_get_tty(
        &self,
        _: *mut LibxlCtx,
        domid: u32,
        path: *mut *mut c_char,
    ) -> c_int {
        self.record("libxl_primary_console_get_tty");

        if domid == 0 {
            return LibxlError::Inval.code();
        }

        let tty = format!("/dev/pts/{domid}\0");
        *path = libc::strdup(tty.as_ptr().cast());
        0
    }

    unsafe fn list_cpupool(&self, _: *mut LibxlCtx, nb_pool: *mut c_int) -> *mut LibxlCpupoolinfo {
        self.record("libxl_list_cpupool");

        if self.fail_list.get() {
            *nb_pool = 0;
            return ptr::null_mut();
        }

        let pools = self.pools.borrow();
        let list = self.alloc::<LibxlCpupoolinfo>(pools.len());

        for (i, pool) in pools.iter().enumerate() {
            *list.add(i) = self.raw_pool(pool);
        }

        *nb_pool = pools.len() as c_int;
        list
    }

    unsafe fn cpupoolinfo_list_free(&self, list: *mut LibxlCpupoolinfo, nb_pool: c_int) {
        self.record("libxl_cpupoolinfo_list_free");

        for i in 0..nb_pool.max(0) as usize {
            self.dispose_pool(list.add(i));
        }
        self.release(list);
    }

    unsafe fn cpupool_info(
        &self,
        _: *mut LibxlCtx,
        info: *mut LibxlCpupoolinfo,
        poolid: u32,
    ) -> c_int {
        self.record("libxl_cpupool_info");

        let pools = self.pools.borrow();
        match pools.iter().find(|pool| pool.poolid == poolid) {
            Some(pool) => {
                *info = self.raw_pool(pool);
                0
            }
            None => LibxlError::Inval.code(),
        }
    }

    unsafe fn cpupoolinfo_dispose(&self, info: *mut LibxlCpupoolinfo) {
        self.record("libxl_cpupoolinfo_dispose");
        self.dispose_pool(info);
    }

    unsafe fn cpupool_create(
        &self,
        _: *mut LibxlCtx,
        name: *const c_char,
        sched: c_int,
        cpumap: LibxlBitmap,
        uuid: *mut LibxlUuid,
        poolid: *mut u32,
    ) -> c_int {
        self.record("libxl_cpupool_create");

        let name = CStr::from_ptr(name).to_string_lossy().into_owned();
        let cpus = Bitmap::from_libxl(&cpumap).expect("invalid cpumap");

        if self.pool(&name).is_some() || !(&cpus & &self.assigned()).is_empty() {
            return LibxlError::Inval.code();
        }

        let mut pools = self.pools.borrow_mut();
        if *poolid == LIBXL_CPUPOOL_POOLID_ANY {
            *poolid = pools.iter().map(|pool| pool.poolid + 1).max().unwrap_or(0);
        }

        pools.push(MockPool {
            poolid: *poolid,
            name,
            scheduler: Scheduler::from_raw(sched),
            cpus,
            uuid: (*uuid).uuid,
        });
        0
    }

    unsafe fn cpupool_destroy(&self, _: *mut LibxlCtx, poolid: u32) -> c_int {
        self.record("libxl_cpupool_destroy");

        if self.domains.borrow().iter().any(|domain| domain.cpupool == poolid) {
            return LibxlError::Fail.code();
        }

        let mut pools = self.pools.borrow_mut();
        match pools.iter().position(|pool| pool.poolid == poolid) {
            Some(index) => {
                pools.remove(index);
                0
            }
            None => LibxlError::Inval.code(),
        }
    }

    unsafe fn cpupool_rename(&self, _: *mut LibxlCtx, name: *const c_char, poolid: u32) -> c_int {
        self.record("libxl_cpupool_rename");

        let name = CStr::from_ptr(name).to_string_lossy().into_owned();
        self.with_pool(poolid, |pool| {
            pool.name = name;
            0
        })
    }

    unsafe fn cpupool_cpuadd(&self, _: *mut LibxlCtx, poolid: u32, cpu: c_int) -> c_int {
        self.record("libxl_cpupool_cpuadd");
        self.add_cpus(poolid, &[cpu as usize].into_iter().collect())
    }

    unsafe fn cpupool_cpuadd_cpumap(
        &self,
        _: *mut LibxlCtx,
        poolid: u32,
        cpumap: *const LibxlBitmap,
    ) -> c_int {
        self.record("libxl_cpupool_cpuadd_cpumap");
        let cpus = Bitmap::from_libxl(&*cpumap).expect("invalid cpumap");
        self.add_cpus(poolid, &cpus)
    }

    unsafe fn cpupool_cpuadd_node(
        &self,
        _: *mut LibxlCtx,
        poolid: u32,
        node: c_int,
        cpus: *mut c_int,
    ) -> c_int {
        self.record("libxl_cpupool_cpuadd_node");

        let free = self.node_cpus(node).difference(&self.assigned());
        let ret = self.add_cpus(poolid, &free);
        if ret == 0 {
            *cpus = free.count() as c_int;
        }
        ret
    }

    unsafe fn cpupool_cpuremove(&self, _: *mut LibxlCtx, poolid: u32, cpu: c_int) -> c_int {
        self.record("libxl_cpupool_cpuremove");
        self.remove_cpus(poolid, &[cpu as usize].into_iter().collect())
    }

    unsafe fn cpupool_cpuremove_cpumap(
        &self,
        _: *mut LibxlCtx,
        poolid: u32,
        cpumap: *const LibxlBitmap,
    ) -> c_int {
        self.record("libxl_cpupool_cpuremove_cpumap");
        let cpus = Bitmap::from_libxl(&*cpumap).expect("invalid cpumap");
        self.remove_cpus(poolid, &cpus)
    }

    unsafe fn cpupool_cpuremove_node(
        &self,
        _: *mut LibxlCtx,
        poolid: u32,
        node: c_int,
        cpus: *mut c_int,
    ) -> c_int {
        self.record("libxl_cpupool_cpuremove_node");

        let pool = self.pools.borrow().iter().find(|pool| pool.poolid == poolid).cloned();
        let Some(pool) = pool else {
            return LibxlError::Inval.code();
        };

        let held = &self.node_cpus(node) & &pool.cpus;
        let ret = self.remove_cpus(poolid, &held);
        if ret == 0 {
            *cpus = held.count() as c_int;
        }
        ret
    }

    unsafe fn cpupool_movedomain(&self, _: *mut LibxlCtx, poolid: u32, domid: u32) -> c_int {
        self.record("libxl_cpupool_movedomain");

        if !self.pools.borrow().iter().any(|pool| pool.poolid == poolid) {
            return LibxlError::Inval.code();
        }

        self.with_domain(domid, |domain| {
            domain.cpupool = poolid;
            0
        })
    }
}
