//! Scripted transport for unit tests.

use crate::infrastructure::bluetooth::transport::{
    Advertisement, BleError, BleLink, BleTransport, GattCharacteristic, GattService,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

#[derive(Default)]
pub(crate) struct MockCounters {
    pub scan_calls: AtomicUsize,
    pub open_calls: AtomicUsize,
    pub service_calls: AtomicUsize,
    pub write_calls: AtomicUsize,
    pub close_calls: AtomicUsize,
}

pub(crate) struct MockTransport {
    advertisements: Vec<Advertisement>,
    profile: Vec<GattService>,
    fail_scan: bool,
    fail_open: bool,
    fail_write: bool,
    pub counters: Arc<MockCounters>,
    pub writes: Arc<Mutex<Vec<(Uuid, Vec<u8>)>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            advertisements: Vec::new(),
            profile: Vec::new(),
            fail_scan: false,
            fail_open: false,
            fail_write: false,
            counters: Arc::new(MockCounters::default()),
            writes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_advertisements(mut self, advertisements: Vec<Advertisement>) -> Self {
        self.advertisements = advertisements;
        self
    }

    pub fn with_profile(mut self, profile: Vec<GattService>) -> Self {
        self.profile = profile;
        self
    }

    pub fn failing_scan(mut self) -> Self {
        self.fail_scan = true;
        self
    }

    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn failing_write(mut self) -> Self {
        self.fail_write = true;
        self
    }
}

#[async_trait]
impl BleTransport for MockTransport {
    async fn scan(&self, _duration: Duration) -> Result<Vec<Advertisement>, BleError> {
        self.counters.scan_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_scan {
            return Err(BleError::Scan("mock scan failure".to_string()));
        }
        Ok(self.advertisements.clone())
    }

    async fn open(&self, _address: &str) -> Result<Box<dyn BleLink>, BleError> {
        self.counters.open_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_open {
            return Err(BleError::Connect("mock connect failure".to_string()));
        }
        Ok(Box::new(MockLink {
            profile: self.profile.clone(),
            fail_write: self.fail_write,
            counters: self.counters.clone(),
            writes: self.writes.clone(),
        }))
    }
}

struct MockLink {
    profile: Vec<GattService>,
    fail_write: bool,
    counters: Arc<MockCounters>,
    writes: Arc<Mutex<Vec<(Uuid, Vec<u8>)>>>,
}

#[async_trait]
impl BleLink for MockLink {
    async fn services(&self) -> Result<Vec<GattService>, BleError> {
        self.counters.service_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.profile.clone())
    }

    async fn write(&self, characteristic: Uuid, payload: &[u8]) -> Result<(), BleError> {
        self.counters.write_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_write {
            return Err(BleError::Write("mock write failure".to_string()));
        }
        self.writes
            .lock()
            .unwrap()
            .push((characteristic, payload.to_vec()));
        Ok(())
    }

    async fn close(&self) -> Result<(), BleError> {
        self.counters.close_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub(crate) fn adv(name: Option<&str>, address: &str) -> Advertisement {
    Advertisement {
        name: name.map(str::to_string),
        address: address.to_string(),
        rssi: Some(-60),
    }
}

pub(crate) fn service(uuid: Uuid, characteristics: Vec<GattCharacteristic>) -> GattService {
    GattService {
        uuid,
        characteristics,
    }
}

pub(crate) fn write_char(uuid: Uuid) -> GattCharacteristic {
    GattCharacteristic {
        uuid,
        writable: true,
    }
}

pub(crate) fn read_char(uuid: Uuid) -> GattCharacteristic {
    GattCharacteristic {
        uuid,
        writable: false,
    }
}
