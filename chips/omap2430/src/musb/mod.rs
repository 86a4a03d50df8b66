// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! The OMAP2430 MUSB glue controller.
//!
//! Usage
//! -----
//!
//! ```rust,ignore
//! let musb = static_init!(
//!     omap2430::Omap2430Musb<'static, MusbCoreMmio, OtgWrapperMmio, Gpt1>,
//!     omap2430::Omap2430Musb::new(&MUSB_CORE, &OTG_WRAPPER, &gpt1, PLATFORM)
//! );
//! musb.set_transceiver(twl4030_usb);
//! musb.set_charger(twl4030_bci);
//! musb.set_root_hub(musb_hcd);
//! musb.set_power_constraints(omap_pm);
//! musb.set_context_loss_counter(pwrdm_core);
//! musb.set_clock(hsotgusb_ick);
//! musb.init()?;
//! ```

mod link;
mod pm;

use core::cell::RefCell;

use critical_section::Mutex;
use log::{debug, error, trace};
use tock_cells::optional_cell::OptionalCell;
use tock_registers::LocalRegisterCopy;

use crate::config::{InterfaceType, MusbMode, PlatformData};
use crate::hil::otg::{Charger, RootHub, Transceiver};
use crate::hil::pm::{ClockInterface, ContextLossCounter, PowerConstraints};
use crate::hil::time::{Alarm, AlarmClient, Ticks32};
use crate::idle::{Rearm, DEFAULT_IDLE_TIMEOUT_MS};
use crate::otg::{OtgCore, OtgState, Role};
use crate::regs::{self, InterfSel, MusbCore, OtgWrapper, SysConfig, WrapperReg};
use crate::ErrorCode;

pub struct Omap2430Musb<'a, M: MusbCore, W: OtgWrapper, A: Alarm<'a>> {
    musb: &'a M,
    wrapper: &'a W,
    alarm: &'a A,
    platform: PlatformData,
    core: Mutex<RefCell<OtgCore>>,
    transceiver: OptionalCell<&'a dyn Transceiver<'a>>,
    charger: OptionalCell<&'a dyn Charger>,
    root_hub: OptionalCell<&'a dyn RootHub>,
    power: OptionalCell<&'a dyn PowerConstraints>,
    loss_counter: OptionalCell<&'a dyn ContextLossCounter>,
    clock: OptionalCell<&'a dyn ClockInterface>,
}

impl<'a, M: MusbCore, W: OtgWrapper, A: Alarm<'a>> Omap2430Musb<'a, M, W, A> {
    pub const fn new(
        musb: &'a M,
        wrapper: &'a W,
        alarm: &'a A,
        platform: PlatformData,
    ) -> Omap2430Musb<'a, M, W, A> {
        Omap2430Musb {
            musb,
            wrapper,
            alarm,
            platform,
            core: Mutex::new(RefCell::new(OtgCore::new())),
            transceiver: OptionalCell::empty(),
            charger: OptionalCell::empty(),
            root_hub: OptionalCell::empty(),
            power: OptionalCell::empty(),
            loss_counter: OptionalCell::empty(),
            clock: OptionalCell::empty(),
        }
    }

    pub fn set_transceiver(&self, transceiver: &'a dyn Transceiver<'a>) {
        self.transceiver.set(transceiver);
    }

    pub fn set_charger(&self, charger: &'a dyn Charger) {
        self.charger.set(charger);
    }

    pub fn set_root_hub(&self, root_hub: &'a dyn RootHub) {
        self.root_hub.set(root_hub);
    }

    pub fn set_power_constraints(&self, power: &'a dyn PowerConstraints) {
        self.power.set(power);
    }

    pub fn set_context_loss_counter(&self, counter: &'a dyn ContextLossCounter) {
        self.loss_counter.set(counter);
    }

    pub fn set_clock(&self, clock: &'a dyn ClockInterface) {
        self.clock.set(clock);
    }

    /// Brings the glue up and hooks it to the transceiver and the idle
    /// alarm.
    ///
    /// Fails with `NODEVICE` when no transceiver was attached; the core
    /// must not be started in that case.
    pub fn init(&'a self) -> Result<(), ErrorCode> {
        if self.transceiver.is_none() {
            error!("HS USB OTG: no transceiver configured");
            return Err(ErrorCode::NODEVICE);
        }

        self.resume();

        critical_section::with(|_cs| {
            let revision = self.platform.revision;
            let mut sysconfig = LocalRegisterCopy::<u32, SysConfig::Register>::new(
                self.wrapper.read(WrapperReg::SysConfig),
            );
            if revision.needs_force_standby() {
                // Without a cable the wrapper must still reach idle, so
                // idle is forced from the start.
                sysconfig.modify(
                    SysConfig::ENABLEWAKEUP::SET
                        + SysConfig::MIDLEMODE::SmartStandby
                        + SysConfig::SIDLEMODE::ForceIdle
                        + SysConfig::AUTOIDLE::CLEAR,
                );
            } else {
                sysconfig.modify(
                    SysConfig::ENABLEWAKEUP::CLEAR
                        + SysConfig::MIDLEMODE::SmartStandby
                        + SysConfig::SIDLEMODE::SmartIdle
                        + SysConfig::AUTOIDLE::CLEAR,
                );
            }
            // AUTOIDLE is broken on OMAP3430
            if revision.supports_autoidle() {
                sysconfig.modify(SysConfig::AUTOIDLE::SET);
            }
            self.wrapper.write(WrapperReg::SysConfig, sysconfig.get());

            let mut interfsel = LocalRegisterCopy::<u32, InterfSel::Register>::new(
                self.wrapper.read(WrapperReg::InterfSel),
            );
            match self.platform.interface_type {
                InterfaceType::Utmi => interfsel.modify(InterfSel::PHYSEL::Utmi8Bit),
                InterfaceType::Ulpi => interfsel.modify(InterfSel::PHYSEL::Ulpi12Pin),
            }
            self.wrapper.write(WrapperReg::InterfSel, interfsel.get());

            debug!(
                "HS USB OTG: revision 0x{:x}, sysconfig 0x{:02x}, sysstatus 0x{:x}, intrfsel 0x{:x}, simenable 0x{:x}",
                self.wrapper.read(WrapperReg::Revision),
                self.wrapper.read(WrapperReg::SysConfig),
                self.wrapper.read(WrapperReg::SysStatus),
                self.wrapper.read(WrapperReg::InterfSel),
                self.wrapper.read(WrapperReg::SimEnable),
            );
        });

        self.transceiver
            .map(|transceiver| transceiver.set_link_client(Some(self)));
        self.alarm.set_alarm_client(self);
        Ok(())
    }

    /// Tears the glue down: no further idle evaluation, controller gated,
    /// link callbacks unhooked.
    pub fn exit(&self) {
        critical_section::with(|cs| {
            let mut core = self.core.borrow_ref_mut(cs);
            core.idle.cancel(self.alarm.now());
            if self.alarm.disarm().is_err() {
                trace!("idle expiry already in flight");
            }
        });
        self.suspend();
        self.clock.clear();
        self.transceiver
            .map(|transceiver| transceiver.set_link_client(None));
    }

    /// Schedules an idle evaluation for `timeout`, or 3 ms from now when
    /// `None` or a zero tick count is passed.
    ///
    /// While the link is active (or waits forever for a B-device) the
    /// pending evaluation is cancelled instead. A pending evaluation that
    /// lies later than `timeout` is kept.
    pub fn try_idle(&self, timeout: Option<Ticks32>) {
        critical_section::with(|cs| {
            let mut core = self.core.borrow_ref_mut(cs);
            let now = self.alarm.now();

            if core.blocks_idle() {
                trace!("{:?} active, deleting idle timer", core.state);
                core.idle.cancel(now);
                if self.alarm.disarm().is_err() {
                    trace!("idle expiry already in flight");
                }
                return;
            }

            let timeout = timeout
                .filter(|t| t.into_u32() != 0)
                .unwrap_or_else(|| {
                    now.wrapping_add(self.alarm.ticks_from_ms(DEFAULT_IDLE_TIMEOUT_MS))
                });
            match core.idle.request(timeout) {
                Rearm::Keep => trace!("longer idle timer already pending, ignoring"),
                Rearm::Arm(deadline) => {
                    let dt = if deadline.is_after(now) {
                        deadline.wrapping_sub(now)
                    } else {
                        Ticks32::from(0)
                    };
                    trace!(
                        "{:?} inactive, idle timer for {} ticks",
                        core.state,
                        dt.into_u32()
                    );
                    self.alarm.set_alarm(now, dt);
                }
            }
        });
    }

    /// Forces VBUS on (host session) or off (peripheral), then tells the
    /// charger.
    pub fn set_vbus(&self, on: bool) {
        critical_section::with(|cs| {
            let state = {
                let mut core = self.core.borrow_ref_mut(cs);
                core.set_vbus(self.musb, on);
                core.state
            };

            self.charger.map(|charger| charger.vbus_kick(on));

            debug!(
                "VBUS {}, devctl {:02x} ({:?})",
                if on { "on" } else { "off" },
                self.musb.readb(regs::DEVCTL),
                state
            );
        });
    }

    /// Switches a dual-role board to host or peripheral.
    ///
    /// Only boards configured for OTG accept mode changes. `Otg` hands the
    /// decision back to ID pin detection and changes nothing.
    pub fn set_mode(&self, mode: MusbMode) -> Result<(), ErrorCode> {
        if self.platform.board_mode != MusbMode::Otg {
            error!("MUSB mode change not permitted");
            return Err(ErrorCode::INVAL);
        }

        let capabilities = self.platform.capabilities;
        match mode {
            MusbMode::Host if capabilities.host => self.set_vbus(true),
            MusbMode::Peripheral if capabilities.peripheral => self.set_vbus(false),
            MusbMode::Otg if capabilities.otg() => {}
            _ => {
                error!("trying to set mode {:?}", mode);
                return Err(ErrorCode::INVAL);
            }
        }
        Ok(())
    }

    fn with_core<R>(&self, f: impl FnOnce(&mut OtgCore) -> R) -> R {
        critical_section::with(|cs| f(&mut self.core.borrow_ref_mut(cs)))
    }

    pub fn otg_state(&self) -> OtgState {
        self.with_core(|core| core.state)
    }

    pub fn role(&self) -> Role {
        self.with_core(|core| core.role)
    }

    pub fn is_active(&self) -> bool {
        self.with_core(|core| core.is_active)
    }

    pub fn default_a(&self) -> bool {
        self.with_core(|core| core.default_a)
    }

    pub fn port1_status(&self) -> u32 {
        self.with_core(|core| core.port1_status.get())
    }

    /// Deadline of the pending idle evaluation.
    pub fn idle_deadline(&self) -> Option<Ticks32> {
        self.with_core(|core| core.idle.deadline())
    }

    /// When the idle evaluation was last cancelled.
    pub fn idle_last_cancel(&self) -> Option<Ticks32> {
        self.with_core(|core| core.idle.last_cancel())
    }

    // The generic core drives these as the link changes state.

    pub fn set_otg_state(&self, state: OtgState) {
        self.with_core(|core| core.state = state);
    }

    pub fn set_active(&self, active: bool) {
        self.with_core(|core| core.is_active = active);
    }

    pub fn set_port1_status(&self, status: u32) {
        self.with_core(|core| core.port1_status.set(status));
    }

    /// A-device wait for B-connect in ms; 0 waits forever and keeps the
    /// link out of idle while in A_WAIT_BCON.
    pub fn set_a_wait_bcon(&self, ms: u32) {
        self.with_core(|core| core.a_wait_bcon = ms);
    }
}

impl<'a, M: MusbCore, W: OtgWrapper, A: Alarm<'a>> AlarmClient for Omap2430Musb<'a, M, W, A> {
    fn alarm(&self) {
        critical_section::with(|cs| {
            let poll_root_hub = {
                let mut core = self.core.borrow_ref_mut(cs);
                if !core.idle.expire() {
                    trace!("cancelled idle expiry ignored");
                    return;
                }
                core.evaluate_idle(self.musb, self.platform.capabilities.host)
            };

            if poll_root_hub {
                self.root_hub.map(|root_hub| root_hub.poll_status());
            }
        });
    }
}
