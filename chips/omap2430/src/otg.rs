// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! OTG state and the idle state machine.
//!
//! [`OtgCore`] is everything the glue mutates. It lives inside the
//! controller's critical-section mutex; every method here runs with that
//! lock held, so a DEVCTL read and the write that depends on it cannot be
//! separated by another context.

use log::debug;
use tock_registers::{register_bitfields, LocalRegisterCopy};

use crate::context::RegisterContext;
use crate::idle::IdleTimer;
use crate::regs::{self, DevCtl, MusbCore, Power};

/// OTG states from the OTG supplement, A- and B-device sides.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OtgState {
    Undefined,

    // single-role peripheral, and dual-role default-b
    BIdle,
    BSrpInit,
    BPeripheral,

    // extra dual-role default-b states
    BWaitAcon,
    BHost,

    // dual-role default-a
    AIdle,
    AWaitVrise,
    AWaitBcon,
    AHost,
    ASuspend,
    APeripheral,
    AWaitVfall,
    AVbusErr,
}

/// Which side of the link the MUSB core is currently driving.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Host,
    Peripheral,
}

register_bitfields![u32,
    /// Root port status as reported to the hub layer. The low half holds
    /// `wPortStatus`, the high half `wPortChange`.
    pub PortStatus [
        /// MUSB-private: root port is driving resume signaling
        RESUME 31,
        C_SUSPEND 18,
        SUSPEND 2
    ]
];

/// Time the A-device waits for a B-device to connect, in ms. Zero means
/// wait forever.
pub const A_WAIT_BCON_DEFAULT_MS: u32 = 1100;

pub(crate) struct OtgCore {
    pub(crate) state: OtgState,
    pub(crate) role: Role,
    /// A session or transfer is in progress; the link must not idle.
    pub(crate) is_active: bool,
    /// This side is the default A-device (forced host).
    pub(crate) default_a: bool,
    pub(crate) a_wait_bcon: u32,
    pub(crate) port1_status: LocalRegisterCopy<u32, PortStatus::Register>,
    pub(crate) idle: IdleTimer,
    pub(crate) context: RegisterContext,
}

impl OtgCore {
    pub(crate) const fn new() -> OtgCore {
        OtgCore {
            state: OtgState::Undefined,
            role: Role::Peripheral,
            is_active: false,
            default_a: false,
            a_wait_bcon: A_WAIT_BCON_DEFAULT_MS,
            port1_status: LocalRegisterCopy::new(0),
            idle: IdleTimer::new(),
            context: RegisterContext::new(),
        }
    }

    /// Whether the idle policy forbids idling right now.
    pub(crate) fn blocks_idle(&self) -> bool {
        self.is_active || (self.a_wait_bcon == 0 && self.state == OtgState::AWaitBcon)
    }

    /// Re-evaluates the OTG state once the link has been quiet for the idle
    /// timeout.
    ///
    /// Returns `true` when the root port status changed and the hub layer
    /// has to be asked to poll it.
    pub(crate) fn evaluate_idle<M: MusbCore>(&mut self, musb: &M, host_capable: bool) -> bool {
        let mut devctl = LocalRegisterCopy::<u8, DevCtl::Register>::new(musb.readb(regs::DEVCTL));

        match self.state {
            OtgState::AWaitBcon => {
                // Don't reset the session in forced host mode
                if !self.default_a {
                    devctl.modify(DevCtl::SESSION::CLEAR);
                    musb.writeb(regs::DEVCTL, devctl.get());

                    devctl.set(musb.readb(regs::DEVCTL));
                }
                if devctl.is_set(DevCtl::BDEVICE) {
                    self.state = OtgState::BIdle;
                    self.role = Role::Peripheral;
                } else {
                    self.state = OtgState::AIdle;
                    self.role = Role::Host;
                }
                false
            }
            OtgState::ASuspend if host_capable => {
                // finish resume signaling?
                if !self.port1_status.is_set(PortStatus::RESUME) {
                    return false;
                }
                let mut power =
                    LocalRegisterCopy::<u8, Power::Register>::new(musb.readb(regs::POWER));
                power.modify(Power::RESUME::CLEAR);
                debug!("root port resume stopped, power {:02x}", power.get());
                musb.writeb(regs::POWER, power.get());
                self.is_active = true;
                self.port1_status.modify(
                    PortStatus::SUSPEND::CLEAR + PortStatus::RESUME::CLEAR + PortStatus::C_SUSPEND::SET,
                );
                // NOTE: it might really be A_WAIT_BCON
                self.state = OtgState::AHost;
                true
            }
            OtgState::AHost if host_capable => {
                devctl.set(musb.readb(regs::DEVCTL));
                self.state = if devctl.is_set(DevCtl::BDEVICE) {
                    OtgState::BIdle
                } else {
                    OtgState::AWaitBcon
                };
                false
            }
            _ => false,
        }
    }

    /// Forces a host (`on`) or peripheral session and writes DEVCTL.
    pub(crate) fn set_vbus<M: MusbCore>(&mut self, musb: &M, on: bool) {
        let mut devctl = LocalRegisterCopy::<u8, DevCtl::Register>::new(musb.readb(regs::DEVCTL));

        if on {
            self.is_active = true;
            self.default_a = true;
            self.state = OtgState::AWaitVrise;
            devctl.modify(DevCtl::SESSION::SET);
            self.role = Role::Host;
        } else {
            self.is_active = false;
            // A_WAIT_VFALL and A_IDLE are skipped, the link goes straight
            // to B_IDLE.
            self.default_a = false;
            self.state = OtgState::BIdle;
            devctl.modify(DevCtl::SESSION::CLEAR);
            self.role = Role::Peripheral;
        }
        musb.writeb(regs::DEVCTL, devctl.get());
    }
}
