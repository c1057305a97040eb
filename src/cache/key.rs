use crate::compose::blend::BlendMode;
use crate::compose::transform::Origin;
use xxhash_rust::xxh3::Xxh3;

const XXH3_SEED: u64 = 0x5f3a_91c4_e2b7_0d68;

/// Opaque content identity of a layer at a given layer-local time.
///
/// Two equal keys promise bit-identical pixels. Layers build them with [`KeyHasher`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentKey {
    hi: u64,
    lo: u64,
}

impl ContentKey {
    /// Raw 128-bit value.
    pub fn as_u128(self) -> u128 {
        (u128::from(self.hi) << 64) | u128::from(self.lo)
    }
}

/// Stable structural hasher producing [`ContentKey`] values.
///
/// The output only depends on the sequence of writes, never on process state, so keys are
/// reproducible across runs.
pub struct KeyHasher {
    inner: Xxh3,
}

impl KeyHasher {
    /// Start a key for content of the given kind (e.g. `"solid"`).
    pub fn new(kind: &str) -> Self {
        let mut h = Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        };
        h.write_str(kind);
        h
    }

    /// Feed raw bytes.
    pub fn write_bytes(&mut self, b: &[u8]) -> &mut Self {
        self.inner.update(b);
        self
    }

    /// Feed a length-prefixed string.
    pub fn write_str(&mut self, s: &str) -> &mut Self {
        self.write_u64(s.len() as u64);
        self.write_bytes(s.as_bytes())
    }

    /// Feed a byte.
    pub fn write_u8(&mut self, v: u8) -> &mut Self {
        self.write_bytes(&[v])
    }

    /// Feed a boolean.
    pub fn write_bool(&mut self, v: bool) -> &mut Self {
        self.write_u8(u8::from(v))
    }

    /// Feed a `u32`.
    pub fn write_u32(&mut self, v: u32) -> &mut Self {
        self.write_bytes(&v.to_le_bytes())
    }

    /// Feed a `u64`.
    pub fn write_u64(&mut self, v: u64) -> &mut Self {
        self.write_bytes(&v.to_le_bytes())
    }

    /// Feed an `f32` by bit pattern.
    pub fn write_f32(&mut self, v: f32) -> &mut Self {
        self.write_u32(v.to_bits())
    }

    /// Feed an `f64` by bit pattern.
    pub fn write_f64(&mut self, v: f64) -> &mut Self {
        self.write_u64(v.to_bits())
    }

    /// Feed another key.
    pub fn write_key(&mut self, k: ContentKey) -> &mut Self {
        self.write_u64(k.hi);
        self.write_u64(k.lo)
    }

    /// Finish into a [`ContentKey`].
    pub fn finish(&self) -> ContentKey {
        let v = self.inner.digest128();
        ContentKey {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

/// Bit patterns of every transform field that affects pixels.
///
/// Storing bits instead of floats keeps equality and hashing total.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TransformKey(pub(crate) [u64; 8]);

/// Tags the kind of cache entry. Only full compositions are cached today.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheTag {
    /// Key of a fully composited frame.
    Composition,
}

/// Sub-key of one component at one point in time.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ComponentKey {
    /// Content identity of the wrapped layer at the resolved layer time.
    pub content: ContentKey,
    /// Placement parameters.
    pub transform: TransformKey,
    /// Pixel-combine mode.
    pub blend: BlendMode,
    /// Anchor origin.
    pub origin: Origin,
    /// `None` when no matte is linked, otherwise the matte's own part.
    pub matte: Option<Box<KeyPart>>,
}

/// One slot of a [`CompositeKey`]: a component is either inactive or identified by its sub-key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyPart {
    /// Component does not contribute at this time.
    Absent,
    /// Component contributes; its pixels are identified by the sub-key.
    Component(ComponentKey),
}

/// Structural identity of a composited frame's inputs.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CompositeKey {
    /// Entry kind.
    pub tag: CacheTag,
    /// Resolution divisor the frame was composited at.
    pub preview_level: u32,
    /// One part per direct component, in paint order.
    pub parts: Vec<KeyPart>,
}

impl CompositeKey {
    /// Start a composition key at `preview_level`.
    pub fn composition(preview_level: u32, parts: Vec<KeyPart>) -> Self {
        Self {
            tag: CacheTag::Composition,
            preview_level,
            parts,
        }
    }

    /// Fold the whole key into a single [`ContentKey`].
    ///
    /// Used when a composition is itself nested as a layer.
    pub fn fingerprint(&self) -> ContentKey {
        let mut h = KeyHasher::new("composition");
        h.write_u32(self.preview_level);
        h.write_u32(self.parts.len() as u32);
        for part in &self.parts {
            write_part(&mut h, part);
        }
        h.finish()
    }
}

fn write_part(h: &mut KeyHasher, part: &KeyPart) {
    match part {
        KeyPart::Absent => {
            h.write_u8(0);
        }
        KeyPart::Component(k) => {
            h.write_u8(1);
            h.write_key(k.content);
            for bits in k.transform.0 {
                h.write_u64(bits);
            }
            h.write_u8(k.blend as u8);
            h.write_u8(k.origin as u8);
            match k.matte.as_deref() {
                None => {
                    h.write_u8(0);
                }
                Some(m) => {
                    h.write_u8(1);
                    write_part(h, m);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/key.rs"]
mod tests;
