// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Platform glue for the Mentor MUSB dual-role controller on OMAP2430-family
//! SoCs (OMAP2430, OMAP34xx, OMAP36xx, OMAP44xx).
//!
//! The generic MUSB core owns endpoints, FIFOs and interrupt dispatch. This
//! crate owns the parts that are specific to the OMAP integration:
//!
//! - the OTG idle state machine, re-evaluated from a deferred idle alarm
//!   ([`Omap2430Musb::try_idle`]),
//! - forcing a host or peripheral session by driving VBUS
//!   ([`Omap2430Musb::set_vbus`], [`Omap2430Musb::set_mode`]),
//! - the link power policy invoked by the transceiver on cable attach and
//!   detach ([`hil::otg::LinkClient`]),
//! - saving and restoring the controller registers around CORE OFF, which
//!   loses them ([`context::RegisterContext`]),
//! - gating the controller across system suspend/resume.
//!
//! All mutable controller state lives behind one
//! `critical_section::Mutex`, so the alarm callback, the PMIC interrupt path
//! and synchronous mode changes never observe each other half-way.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod context;
pub mod errorcode;
pub mod hil;
pub mod idle;
pub mod musb;
pub mod otg;
pub mod regs;

#[cfg(test)]
mod fake;

pub use crate::errorcode::ErrorCode;
pub use crate::musb::Omap2430Musb;
