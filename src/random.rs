//! Seeded byte source compatible with CPython's `random` module.
//!
//! The canonical random test payloads were defined as the output of
//! `random.seed(n)` followed by repeated `random.randrange(256)`. [`PyRandom`]
//! reproduces that stream bit for bit:
//!
//! - MT19937 seeded through `init_by_array`, with the key being the absolute
//!   seed split into little-endian 32-bit words (`0` becomes the key `[0]`);
//! - `getrandbits(k)` for `k <= 32` takes the top `k` bits of one output word;
//! - `randrange(n)` draws `getrandbits(bit_length(n))` until the value is `< n`.

// ── MT19937 parameters ───────────────────────────────────────────────────────

const MT_N: usize = 624;
const MT_M: usize = 397;
const MT_MATRIX_A: u32 = 0x9908_b0df;
const MT_UPPER_MASK: u32 = 0x8000_0000;
const MT_LOWER_MASK: u32 = 0x7fff_ffff;
const MT_INIT_MULT: u32 = 1_812_433_253;
const MT_ARRAY_SEED: u32 = 19_650_218;
const MT_ARRAY_MULT_A: u32 = 1_664_525;
const MT_ARRAY_MULT_B: u32 = 1_566_083_941;

/// Mersenne Twister seeded the way CPython seeds `random.Random`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PyRandom {
    mt: Vec<u32>,
    pos: usize,
}

impl PyRandom {
    /// Equivalent of `random.seed(seed)` for a non-negative integer seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let low = seed as u32;
        let high = (seed >> 32) as u32;
        if high == 0 {
            Self::from_key(&[low])
        } else {
            Self::from_key(&[low, high])
        }
    }

    /// `init_by_array` seeding from an explicit key.
    ///
    /// An empty key is treated as `[0]`.
    #[must_use]
    pub fn from_key(key: &[u32]) -> Self {
        let key: &[u32] = if key.is_empty() { &[0] } else { key };
        let mut mt = init_genrand(MT_ARRAY_SEED);

        let mut i = 1usize;
        let mut j = 0usize;
        for _ in 0..MT_N.max(key.len()) {
            let prev = mt[i - 1] ^ (mt[i - 1] >> 30);
            mt[i] = (mt[i] ^ prev.wrapping_mul(MT_ARRAY_MULT_A))
                .wrapping_add(key[j])
                .wrapping_add(j as u32);
            i += 1;
            j += 1;
            if i >= MT_N {
                mt[0] = mt[MT_N - 1];
                i = 1;
            }
            if j >= key.len() {
                j = 0;
            }
        }
        for _ in 0..MT_N - 1 {
            let prev = mt[i - 1] ^ (mt[i - 1] >> 30);
            mt[i] = (mt[i] ^ prev.wrapping_mul(MT_ARRAY_MULT_B)).wrapping_sub(i as u32);
            i += 1;
            if i >= MT_N {
                mt[0] = mt[MT_N - 1];
                i = 1;
            }
        }
        mt[0] = MT_UPPER_MASK;

        Self { mt, pos: MT_N }
    }

    fn twist(&mut self) {
        for kk in 0..MT_N {
            let y = (self.mt[kk] & MT_UPPER_MASK) | (self.mt[(kk + 1) % MT_N] & MT_LOWER_MASK);
            let mag = if y & 1 != 0 { MT_MATRIX_A } else { 0 };
            self.mt[kk] = self.mt[(kk + MT_M) % MT_N] ^ (y >> 1) ^ mag;
        }
    }

    #[inline]
    fn temper(mut y: u32) -> u32 {
        y ^= y >> 11;
        y ^= (y << 7) & 0x9d2c_5680;
        y ^= (y << 15) & 0xefc6_0000;
        y ^= y >> 18;
        y
    }

    /// Next 32-bit output word (`getrandbits(32)`).
    pub fn next_u32(&mut self) -> u32 {
        if self.pos >= MT_N {
            self.twist();
            self.pos = 0;
        }
        let y = self.mt[self.pos];
        self.pos += 1;
        Self::temper(y)
    }

    /// `getrandbits(k)` for `1 <= k <= 32`; `k == 0` yields `0`.
    pub fn getrandbits(&mut self, k: u32) -> u32 {
        match k {
            0 => 0,
            1..=31 => self.next_u32() >> (32 - k),
            _ => self.next_u32(),
        }
    }

    /// `randrange(n)`: uniform in `[0, n)` by rejection sampling.
    ///
    /// `n == 0` yields `0` without consuming output.
    pub fn randrange(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        let k = u32::BITS - n.leading_zeros();
        loop {
            let r = self.getrandbits(k);
            if r < n {
                return r;
            }
        }
    }

    /// Fills `buf` with `randrange(256)` draws, one per byte.
    pub fn fill_bytes(&mut self, buf: &mut [u8]) {
        for b in buf.iter_mut() {
            *b = self.randrange(256) as u8;
        }
    }

    /// Returns `len` bytes, as `bytes(randrange(256) for _ in range(len))`.
    #[must_use]
    pub fn bytes(&mut self, len: usize) -> Vec<u8> {
        let mut buf = vec![0u8; len];
        self.fill_bytes(&mut buf);
        buf
    }
}

fn init_genrand(seed: u32) -> Vec<u32> {
    let mut mt = vec![0u32; MT_N];
    mt[0] = seed;
    for i in 1..MT_N {
        mt[i] = MT_INIT_MULT
            .wrapping_mul(mt[i - 1] ^ (mt[i - 1] >> 30))
            .wrapping_add(i as u32);
    }
    mt
}
