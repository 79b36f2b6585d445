//! Fixed-capacity particle pool.
//!
//! Live particles always occupy the prefix `[0, len)` of the storage. A dead
//! particle is replaced by the last live one (swap-removal), so removal is
//! O(1) and the live range never has gaps. The vertex buffer runs parallel
//! to the particle storage and moves with it.

use pex_common::PointSprite;
use tracing::trace;

use crate::particle::Particle;

/// Particle storage plus the render-ready vertex buffer.
pub struct ParticlePool {
    /// Particle slots, allocated once at full capacity.
    particles: Vec<Particle>,
    /// Vertex records, parallel to `particles`.
    vertices: Vec<PointSprite>,
    /// Number of live particles.
    live: usize,
}

impl ParticlePool {
    /// Creates a pool with room for `capacity` particles.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: vec![Particle::default(); capacity],
            vertices: vec![PointSprite::default(); capacity],
            live: 0,
        }
    }

    /// Maximum number of live particles.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    /// Number of live particles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns true if no particle is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Returns true if every slot is taken.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.live >= self.capacity()
    }

    /// Claims the next free slot.
    ///
    /// Returns `None` when the pool is saturated. The slot holds stale data
    /// until the caller initializes it.
    pub fn try_spawn(&mut self) -> Option<usize> {
        if self.is_full() {
            trace!("Particle pool saturated at {}", self.capacity());
            return None;
        }
        let slot = self.live;
        self.live += 1;
        Some(slot)
    }

    /// Mutable access to a live slot.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Particle> {
        self.particles[..self.live].get_mut(index)
    }

    /// Removes the live particle at `index` by moving the last live particle
    /// (and its vertex record) into its place.
    pub fn kill_at(&mut self, index: usize) {
        if index >= self.live {
            return;
        }
        let last = self.live - 1;
        if index != last {
            self.particles.swap(index, last);
            self.vertices.swap(index, last);
        }
        self.live = last;
    }

    /// Visits every live particle with its vertex slot.
    ///
    /// `f` returns whether the particle is still alive. Dead particles are
    /// swap-removed right away and the particle moved into their slot is
    /// visited next, so each live particle is seen exactly once per pass.
    pub fn for_each_live(&mut self, mut f: impl FnMut(&mut Particle, &mut PointSprite) -> bool) {
        let mut index = 0;
        while index < self.live {
            if f(&mut self.particles[index], &mut self.vertices[index]) {
                index += 1;
            } else {
                self.kill_at(index);
            }
        }
    }

    /// Live particles in storage order.
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles[..self.live]
    }

    /// Vertex records of the live particles.
    #[must_use]
    pub fn vertices(&self) -> &[PointSprite] {
        &self.vertices[..self.live]
    }

    /// Drops every live particle.
    pub fn clear(&mut self) {
        self.live = 0;
    }
}

impl std::fmt::Debug for ParticlePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticlePool")
            .field("live", &self.live)
            .field("capacity", &self.capacity())
            .finish_non_exhaustive()
    }
}
