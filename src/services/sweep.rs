// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Periodic background sweep over time-driven ride transitions.

use crate::services::rides::{RideLifecycle, SweepReport};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub struct RideSweeper {
    rides: RideLifecycle,
}

impl RideSweeper {
    pub fn new(rides: RideLifecycle) -> Self {
        Self { rides }
    }

    /// One pass at `now`.
    pub async fn run_once(&self, now: DateTime<Utc>) -> SweepReport {
        let report = self.rides.sweep(now).await;
        if report != SweepReport::default() {
            tracing::info!(
                expired = report.expired,
                promoted = report.promoted,
                settlements_retried = report.settlements_retried,
                "Ride sweep"
            );
        } else {
            tracing::trace!("Ride sweep found nothing to do");
        }
        report
    }

    /// Run forever on `interval`. Abort the handle to stop.
    pub fn spawn(self, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.run_once(Utc::now()).await;
            }
        })
    }
}
