// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! System suspend/resume gating of the controller.

use tock_registers::LocalRegisterCopy;

use super::Omap2430Musb;
use crate::hil::time::Alarm;
use crate::regs::{ForceStandby, MusbCore, OtgWrapper, SysConfig, WrapperReg};

impl<'a, M: MusbCore, W: OtgWrapper, A: Alarm<'a>> Omap2430Musb<'a, M, W, A> {
    /// Asserts (`true`) or releases MSTANDBY towards the PRCM.
    pub(super) fn set_mstandby(&self, on: bool) {
        let mut forcestdby = LocalRegisterCopy::<u32, ForceStandby::Register>::new(
            self.wrapper.read(WrapperReg::ForceStandby),
        );
        if on {
            forcestdby.modify(ForceStandby::ENABLEFORCE::SET);
        } else {
            forcestdby.modify(ForceStandby::ENABLEFORCE::CLEAR);
        }
        self.wrapper.write(WrapperReg::ForceStandby, forcestdby.get());
    }

    fn set_wakeup(&self, on: bool) {
        let mut sysconfig = LocalRegisterCopy::<u32, SysConfig::Register>::new(
            self.wrapper.read(WrapperReg::SysConfig),
        );
        if on {
            sysconfig.modify(SysConfig::ENABLEWAKEUP::SET);
        } else {
            sysconfig.modify(SysConfig::ENABLEWAKEUP::CLEAR);
        }
        self.wrapper.write(WrapperReg::SysConfig, sysconfig.get());
    }

    /// Puts the controller in standby with wake-up enabled and gates its
    /// clock. Does nothing on boards without a controller clock.
    pub fn suspend(&self) {
        if self.clock.is_none() {
            return;
        }

        critical_section::with(|_cs| {
            self.set_mstandby(true);
            self.set_wakeup(true);
        });

        self.transceiver
            .map(|transceiver| transceiver.set_suspend(true));
        self.clock.map(|clock| clock.disable());
    }

    /// Undoes [`suspend`](Self::suspend).
    pub fn resume(&self) {
        if self.clock.is_none() {
            return;
        }

        self.transceiver
            .map(|transceiver| transceiver.set_suspend(false));
        self.clock.map(|clock| {
            if !clock.is_enabled() {
                clock.enable();
            }
        });

        critical_section::with(|_cs| {
            self.set_wakeup(false);
            self.set_mstandby(false);
        });
    }
}
