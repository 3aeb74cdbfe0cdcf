//! Test doubles for the store and JOSE seams

#![allow(dead_code)]

use keyrotor_jwt::{Curve, Es256Jose, Es256KeyPair, Jose, JwtClaims, JwtError, JwtResult};
use keyrotor_key::{ActiveKeyPair, KeyError, KeyPairStore, SigningKey, Slot};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory store that can be told to fail persistence.
#[derive(Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<Slot, keyrotor_jwt::EcJwk>>,
    fail_persist: AtomicBool,
    pub persist_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_persist.store(failing, Ordering::SeqCst);
    }

    pub fn persisted_kid(&self, slot: Slot) -> Option<String> {
        self.slots.lock().unwrap().get(&slot).map(|jwk| jwk.kid.clone())
    }
}

impl KeyPairStore for MemoryStore {
    fn slot_exists(&self, slot: Slot) -> bool {
        self.slots.lock().unwrap().contains_key(&slot)
    }

    fn load_slot(&self, slot: Slot) -> keyrotor_key::Result<SigningKey> {
        let slots = self.slots.lock().unwrap();
        let jwk = slots.get(&slot).ok_or_else(|| KeyError::Io {
            path: slot.file_name().into(),
            source: std::io::ErrorKind::NotFound.into(),
        })?;
        SigningKey::from_private_jwk(jwk, chrono::Utc::now())
    }

    fn persist(&self, pair: &ActiveKeyPair) -> keyrotor_key::Result<()> {
        self.persist_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_persist.load(Ordering::SeqCst) {
            return Err(KeyError::Io {
                path: "memory".into(),
                source: std::io::Error::other("disk full"),
            });
        }
        let mut slots = self.slots.lock().unwrap();
        slots.insert(Slot::Secondary, pair.secondary().to_private_jwk()?);
        slots.insert(Slot::Primary, pair.primary().to_private_jwk()?);
        Ok(())
    }
}

/// Real ES256 that records overlapping `generate` calls and can be slowed
/// down or made to fail.
#[derive(Default)]
pub struct InstrumentedJose {
    inner: Es256Jose,
    in_flight: AtomicUsize,
    pub overlaps: AtomicUsize,
    pub generated: AtomicUsize,
    delay_ms: AtomicUsize,
    fail_generate: AtomicBool,
}

impl InstrumentedJose {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_delay(delay: Duration) -> Arc<Self> {
        let jose = Self::default();
        jose.delay_ms
            .store(delay.as_millis() as usize, Ordering::SeqCst);
        Arc::new(jose)
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_generate.store(failing, Ordering::SeqCst);
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

impl Jose for InstrumentedJose {
    fn generate(&self, curve: Curve) -> JwtResult<Es256KeyPair> {
        if self.in_flight.fetch_add(1, Ordering::SeqCst) > 0 {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            std::thread::sleep(Duration::from_millis(delay as u64));
        }
        let result = if self.fail_generate.load(Ordering::SeqCst) {
            Err(JwtError::KeyGeneration("entropy unavailable".to_string()))
        } else {
            self.inner.generate(curve)
        };
        self.generated.fetch_add(1, Ordering::SeqCst);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn sign(&self, claims: &JwtClaims, kid: &str, key: &Es256KeyPair) -> JwtResult<String> {
        self.inner.sign(claims, kid, key)
    }

    fn verify(&self, token: &str, public_key: &[u8]) -> bool {
        self.inner.verify(token, public_key)
    }

    fn alg(&self) -> &'static str {
        self.inner.alg()
    }
}
