// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Link power policy, driven by the transceiver on cable attach and detach.

use log::trace;
use tock_registers::LocalRegisterCopy;

use super::Omap2430Musb;
use crate::hil::otg::LinkClient;
use crate::hil::time::Alarm;
use crate::regs::{MusbCore, OtgWrapper, SysConfig, WrapperReg};

/// MPU wake-up latency bound in µs while a cable is attached. Keeps CORE
/// out of OFF, where the controller would lose its registers mid-session.
pub const MPU_WAKEUP_LATENCY_US: u32 = 6250;

impl<'a, M: MusbCore, W: OtgWrapper, A: Alarm<'a>> LinkClient for Omap2430Musb<'a, M, W, A> {
    fn save_context(&self) {
        critical_section::with(|cs| {
            let loss_count = self.loss_counter.map(|counter| counter.context_loss_count());
            self.core
                .borrow_ref_mut(cs)
                .context
                .save(self.musb, self.wrapper, loss_count);

            self.power.map(|power| {
                if self.platform.revision.needs_wakeup_constraint() {
                    power.set_max_mpu_wakeup_lat(None);
                }
                power.set_vdd1_opp(self.platform.min_vdd1_opp);
            });
        });
    }

    fn restore_context(&self) {
        critical_section::with(|cs| {
            self.power.map(|power| {
                if self.platform.revision.needs_wakeup_constraint() {
                    power.set_max_mpu_wakeup_lat(Some(MPU_WAKEUP_LATENCY_US));
                }
                power.set_vdd1_opp(self.platform.max_vdd1_opp);
            });

            let core = self.core.borrow_ref(cs);
            let unchanged = self
                .loss_counter
                .map_or(false, |counter| {
                    core.context.loss_count() == counter.context_loss_count()
                });
            if unchanged {
                trace!("no context was lost, skipping restore");
                return;
            }
            core.context
                .restore(self.musb, self.wrapper, self.platform.wrapper_restore);
        });
    }

    fn force_active(&self, enable: bool) {
        critical_section::with(|_cs| {
            let force_standby = self.platform.revision.needs_force_standby();
            let mut sysconfig = LocalRegisterCopy::<u32, SysConfig::Register>::new(
                self.wrapper.read(WrapperReg::SysConfig),
            );

            if enable {
                sysconfig.modify(SysConfig::MIDLEMODE::NoStandby + SysConfig::SIDLEMODE::NoIdle);
                if force_standby {
                    self.set_mstandby(false);
                }
            } else if force_standby {
                sysconfig.modify(
                    SysConfig::ENABLEWAKEUP::SET
                        + SysConfig::MIDLEMODE::ForceStandby
                        + SysConfig::SIDLEMODE::ForceIdle,
                );
                self.set_mstandby(true);
            } else {
                sysconfig.modify(
                    SysConfig::MIDLEMODE::SmartStandby + SysConfig::SIDLEMODE::SmartIdle,
                );
            }
            self.wrapper.write(WrapperReg::SysConfig, sysconfig.get());
        });
    }
}
