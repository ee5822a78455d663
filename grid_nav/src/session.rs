//! Threaded mapping session.
//!
//! A sensor thread owns the single [`RaySender`] and pushes rays in the order they were
//! measured. The session applies them to the grid one at a time, so `add_ray` is never run
//! concurrently, and hands planners an owned mask snapshot rather than a view of the live grid.

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use log::{debug, trace};

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::SessionError;
use crate::highlevel_planners::highlevel_planners::HighLevelPlanner;
use crate::highlevel_planners::path::Path;
use crate::map_representation::obstacle_mask::ObstacleMask;
use crate::map_representation::occupancy_grid::OccupancyGrid;
use crate::{Cell, Ray};

/// Producer end of the ray channel. Deliberately not `Clone`: rays must come from one
/// ordered source.
pub struct RaySender {
    tx: Sender<Ray>,
}

impl RaySender {
    pub fn send(&self, ray: Ray) -> Result<(), SessionError> {
        self.tx.send(ray).map_err(|_| SessionError::Disconnected)
    }
}

/// Owns the grid and the consumer end of the ray channel.
pub struct MappingSession {
    grid: Arc<Mutex<OccupancyGrid>>,
    rx: Receiver<Ray>,
}

impl MappingSession {
    pub fn new(grid: OccupancyGrid) -> (Self, RaySender) {
        let (tx, rx) = unbounded();
        debug!("Starting mapping session on a {0}x{0} grid", grid.size());
        (
            Self {
                grid: Arc::new(Mutex::new(grid)),
                rx,
            },
            RaySender { tx },
        )
    }

    fn lock(&self) -> Result<MutexGuard<'_, OccupancyGrid>, SessionError> {
        self.grid.lock().map_err(|_| SessionError::Poisoned)
    }

    /// Shared handle for read-only collaborators
    pub fn grid(&self) -> Arc<Mutex<OccupancyGrid>> {
        self.grid.clone()
    }

    pub fn with_grid<R>(&self, f: impl FnOnce(&OccupancyGrid) -> R) -> Result<R, SessionError> {
        let grid = self.lock()?;
        Ok(f(&grid))
    }

    /// Apply every ray already waiting in the channel. Returns the number applied.
    ///
    /// The grid is locked before anything is taken off the channel, so a poisoned lock leaves
    /// every pending ray queued.
    pub fn drain(&self) -> Result<usize, SessionError> {
        let mut grid = self.lock()?;
        let mut applied = 0;
        loop {
            match self.rx.try_recv() {
                Ok(ray) => {
                    grid.add_ray(ray);
                    applied += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        trace!("Drained {} rays", applied);
        Ok(applied)
    }

    /// Block applying rays until the sender is dropped. Returns the number applied.
    ///
    /// The lock is only taken once a ray has arrived, so readers are not starved while the
    /// sensor is idle. A poisoned lock ends the session with [`SessionError::Poisoned`] and the
    /// ray just received is lost, the ones behind it stay queued.
    pub fn run_until_disconnected(&self) -> Result<usize, SessionError> {
        let mut applied = 0;
        while let Ok(ray) = self.rx.recv() {
            self.lock()?.add_ray(ray);
            applied += 1;
        }
        debug!("Ray sender disconnected after {} rays", applied);
        Ok(applied)
    }

    /// Obstacle mask of the grid as it is now. Later rays do not affect it.
    pub fn mask_snapshot(&self) -> Result<ObstacleMask, SessionError> {
        Ok(self.lock()?.obstacle_mask())
    }

    /// Plan on a snapshot so the grid lock is not held while searching.
    pub fn route<P: HighLevelPlanner>(
        &self,
        planner: &P,
        start: Cell,
        goal: Cell,
    ) -> Result<Option<Path>, SessionError> {
        let mask = self.mask_snapshot()?;
        Ok(planner.plan(&mask, start, goal)?)
    }
}
