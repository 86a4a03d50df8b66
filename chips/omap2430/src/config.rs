// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Board configuration for the MUSB glue.
//!
//! Boards build a [`PlatformData`] in `main.rs` and hand it to
//! [`Omap2430Musb::new`](crate::Omap2430Musb::new). Every branch that
//! depends on the silicon or on which roles were built in is selected from
//! these values at runtime.

use crate::ErrorCode;

/// Controller mode, as configured by the board or requested at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MusbMode {
    Host = 1,
    Peripheral = 2,
    Otg = 3,
}

impl TryFrom<u8> for MusbMode {
    type Error = ErrorCode;

    fn try_from(mode: u8) -> Result<Self, Self::Error> {
        match mode {
            1 => Ok(MusbMode::Host),
            2 => Ok(MusbMode::Peripheral),
            3 => Ok(MusbMode::Otg),
            _ => Err(ErrorCode::INVAL),
        }
    }
}

/// PHY interface between the wrapper and the transceiver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterfaceType {
    /// External transceiver over 12-pin ULPI (TWL4030 family)
    Ulpi,
    /// Internal 8-bit UTMI PHY (OMAP4)
    Utmi,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SiliconRevision {
    Omap2430,
    Omap3430,
    Omap3630,
    Omap4430,
}

impl SiliconRevision {
    /// No hardware save-and-restore for the MUSB: while a cable is attached
    /// CORE must not reach OFF, so the MPU wake-up latency is bounded.
    pub fn needs_wakeup_constraint(self) -> bool {
        matches!(self, SiliconRevision::Omap3430 | SiliconRevision::Omap3630)
    }

    /// OTG idle acknowledge is unreliable on detach; force idle and standby
    /// instead of relying on smart idle.
    pub fn needs_force_standby(self) -> bool {
        self == SiliconRevision::Omap3630
    }

    /// Wrapper AUTOIDLE does not work on this revision.
    pub fn supports_autoidle(self) -> bool {
        self != SiliconRevision::Omap3430
    }
}

/// Which roles the controller stack was built with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    pub host: bool,
    pub peripheral: bool,
}

impl Capabilities {
    pub const OTG: Capabilities = Capabilities {
        host: true,
        peripheral: true,
    };

    pub fn otg(self) -> bool {
        self.host && self.peripheral
    }
}

/// Who writes the wrapper SYSCONFIG/FORCESTDBY pair back after context loss.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WrapperRestore {
    /// The context restore writes them with the rest of the snapshot.
    WithContext,
    /// The board resumes them from a link-state callback raised by the PMIC
    /// VBUS interrupt, so the context restore leaves them alone.
    ByLinkState,
}

pub struct PlatformData {
    pub board_mode: MusbMode,
    pub interface_type: InterfaceType,
    pub revision: SiliconRevision,
    pub capabilities: Capabilities,
    /// VDD1 OPP requested while no cable is attached
    pub min_vdd1_opp: u8,
    /// VDD1 OPP requested while a cable is attached
    pub max_vdd1_opp: u8,
    pub wrapper_restore: WrapperRestore,
}
