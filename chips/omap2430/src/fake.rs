// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Software stand-ins for the MUSB core, the OTG wrapper and the
//! collaborators, used by the unit tests.

use core::cell::{Cell, RefCell};
use std::boxed::Box;
use std::vec::Vec;

use tock_cells::optional_cell::OptionalCell;

use crate::config::{
    Capabilities, InterfaceType, MusbMode, PlatformData, SiliconRevision, WrapperRestore,
};
use crate::hil::otg::{Charger, LinkClient, RootHub, Transceiver};
use crate::hil::pm::{ClockInterface, ContextLossCounter, PowerConstraints};
use crate::hil::time::{Alarm, AlarmClient, Freq1KHz, Ticks32, Time};
use crate::regs::{MusbCore, OtgWrapper, WrapperReg, INDEX, NUM_ENDPOINTS};
use crate::{ErrorCode, Omap2430Musb};

const SPACE: usize = 0x80;
const BANK_START: usize = 0x10;
const BANK_LEN: usize = 0x10;

/// One register access as seen on the bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Access {
    Read8(usize),
    Read16(usize),
    Write8(usize, u8),
    Write16(usize, u16),
}

/// Byte-addressed MUSB register file with the 0x10 window banked by
/// `INDEX`. Halfwords are little-endian and may straddle registers.
pub(crate) struct FakeMusb {
    common: RefCell<[u8; SPACE]>,
    banks: RefCell<[[u8; BANK_LEN]; NUM_ENDPOINTS]>,
    log: RefCell<Vec<Access>>,
}

impl FakeMusb {
    pub(crate) fn new() -> FakeMusb {
        FakeMusb {
            common: RefCell::new([0; SPACE]),
            banks: RefCell::new([[0; BANK_LEN]; NUM_ENDPOINTS]),
            log: RefCell::new(Vec::new()),
        }
    }

    fn selected(&self) -> usize {
        usize::from(self.common.borrow()[INDEX]) % NUM_ENDPOINTS
    }

    fn byte(&self, offset: usize) -> u8 {
        if (BANK_START..BANK_START + BANK_LEN).contains(&offset) {
            let ep = self.selected();
            self.banks.borrow()[ep][offset - BANK_START]
        } else {
            self.common.borrow()[offset]
        }
    }

    fn set_byte(&self, offset: usize, val: u8) {
        if (BANK_START..BANK_START + BANK_LEN).contains(&offset) {
            let ep = self.selected();
            self.banks.borrow_mut()[ep][offset - BANK_START] = val;
        } else {
            self.common.borrow_mut()[offset] = val;
        }
    }

    /// Sets a register without logging an access.
    pub(crate) fn poke(&self, offset: usize, val: u8) {
        self.set_byte(offset, val);
    }

    pub(crate) fn poke_w(&self, offset: usize, val: u16) {
        let [lo, hi] = val.to_le_bytes();
        self.set_byte(offset, lo);
        self.set_byte(offset + 1, hi);
    }

    pub(crate) fn peek(&self, offset: usize) -> u8 {
        self.byte(offset)
    }

    pub(crate) fn poke_banked(&self, ep: usize, offset: usize, val: u8) {
        self.banks.borrow_mut()[ep][offset - BANK_START] = val;
    }

    pub(crate) fn poke_banked_w(&self, ep: usize, offset: usize, val: u16) {
        let [lo, hi] = val.to_le_bytes();
        self.poke_banked(ep, offset, lo);
        self.poke_banked(ep, offset + 1, hi);
    }

    pub(crate) fn set_devctl(&self, val: u8) {
        self.poke(crate::regs::DEVCTL, val);
    }

    pub(crate) fn accesses(&self) -> Vec<Access> {
        self.log.borrow().clone()
    }

    pub(crate) fn write_count(&self) -> usize {
        self.log
            .borrow()
            .iter()
            .filter(|a| matches!(a, Access::Write8(..) | Access::Write16(..)))
            .count()
    }

    pub(crate) fn clear_log(&self) {
        self.log.borrow_mut().clear();
    }

    /// The complete register file, shared space and every bank.
    pub(crate) fn dump(&self) -> ([u8; SPACE], [[u8; BANK_LEN]; NUM_ENDPOINTS]) {
        (*self.common.borrow(), *self.banks.borrow())
    }
}

impl MusbCore for FakeMusb {
    fn readb(&self, offset: usize) -> u8 {
        self.log.borrow_mut().push(Access::Read8(offset));
        self.byte(offset)
    }

    fn readw(&self, offset: usize) -> u16 {
        self.log.borrow_mut().push(Access::Read16(offset));
        u16::from_le_bytes([self.byte(offset), self.byte(offset + 1)])
    }

    fn writeb(&self, offset: usize, val: u8) {
        self.log.borrow_mut().push(Access::Write8(offset, val));
        self.set_byte(offset, val);
    }

    fn writew(&self, offset: usize, val: u16) {
        self.log.borrow_mut().push(Access::Write16(offset, val));
        self.poke_w(offset, val);
    }
}

pub(crate) struct FakeWrapper {
    regs: RefCell<[u32; 6]>,
    writes: RefCell<Vec<(WrapperReg, u32)>>,
}

impl FakeWrapper {
    pub(crate) fn new() -> FakeWrapper {
        FakeWrapper {
            regs: RefCell::new([0; 6]),
            writes: RefCell::new(Vec::new()),
        }
    }

    fn slot(reg: WrapperReg) -> usize {
        match reg {
            WrapperReg::Revision => 0,
            WrapperReg::SysConfig => 1,
            WrapperReg::SysStatus => 2,
            WrapperReg::InterfSel => 3,
            WrapperReg::SimEnable => 4,
            WrapperReg::ForceStandby => 5,
        }
    }

    pub(crate) fn poke(&self, reg: WrapperReg, val: u32) {
        self.regs.borrow_mut()[Self::slot(reg)] = val;
    }

    pub(crate) fn peek(&self, reg: WrapperReg) -> u32 {
        self.regs.borrow()[Self::slot(reg)]
    }

    pub(crate) fn writes(&self) -> Vec<(WrapperReg, u32)> {
        self.writes.borrow().clone()
    }

    pub(crate) fn clear_log(&self) {
        self.writes.borrow_mut().clear();
    }
}

impl OtgWrapper for FakeWrapper {
    fn read(&self, reg: WrapperReg) -> u32 {
        self.peek(reg)
    }

    fn write(&self, reg: WrapperReg, val: u32) {
        self.writes.borrow_mut().push((reg, val));
        self.poke(reg, val);
    }
}

/// Millisecond alarm driven by hand from the test.
pub(crate) struct FakeAlarm<'a> {
    now: Cell<u32>,
    reference: Cell<u32>,
    dt: Cell<u32>,
    armed: Cell<bool>,
    /// Expired, callback not yet delivered
    in_flight: Cell<bool>,
    client: OptionalCell<&'a dyn AlarmClient>,
}

impl<'a> FakeAlarm<'a> {
    pub(crate) fn new() -> FakeAlarm<'a> {
        FakeAlarm {
            now: Cell::new(0),
            reference: Cell::new(0),
            dt: Cell::new(0),
            armed: Cell::new(false),
            in_flight: Cell::new(false),
            client: OptionalCell::empty(),
        }
    }

    pub(crate) fn set_now(&self, now: u32) {
        self.now.set(now);
    }

    /// Expiry of the last `set_alarm`.
    pub(crate) fn get_alarm(&self) -> Ticks32 {
        Ticks32::from(self.reference.get().wrapping_add(self.dt.get()))
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.armed.get()
    }

    pub(crate) fn dt(&self) -> u32 {
        self.dt.get()
    }

    pub(crate) fn has_client(&self) -> bool {
        self.client.is_some()
    }

    /// Lets the armed alarm expire without delivering the callback yet.
    pub(crate) fn latch(&self) {
        if self.armed.replace(false) {
            self.in_flight.set(true);
            self.now.set(self.get_alarm().into_u32());
        }
    }

    /// Delivers a latched expiry to the client.
    pub(crate) fn deliver(&self) {
        if self.in_flight.replace(false) {
            self.client.map(|client| client.alarm());
        }
    }

    /// Advances time to the armed expiry and delivers it.
    pub(crate) fn fire(&self) {
        self.latch();
        self.deliver();
    }
}

impl Time for FakeAlarm<'_> {
    type Frequency = Freq1KHz;

    fn now(&self) -> Ticks32 {
        Ticks32::from(self.now.get())
    }
}

impl<'a> Alarm<'a> for FakeAlarm<'a> {
    fn set_alarm_client(&self, client: &'a dyn AlarmClient) {
        self.client.set(client);
    }

    fn set_alarm(&self, reference: Ticks32, dt: Ticks32) {
        self.reference.set(reference.into_u32());
        self.dt.set(dt.into_u32());
        self.in_flight.set(false);
        self.armed.set(true);
    }

    fn disarm(&self) -> Result<(), ErrorCode> {
        self.armed.set(false);
        if self.in_flight.get() {
            Err(ErrorCode::FAIL)
        } else {
            Ok(())
        }
    }
}

pub(crate) struct FakeTransceiver<'a> {
    link: OptionalCell<&'a dyn LinkClient>,
    suspends: RefCell<Vec<bool>>,
}

impl<'a> FakeTransceiver<'a> {
    pub(crate) fn new() -> FakeTransceiver<'a> {
        FakeTransceiver {
            link: OptionalCell::empty(),
            suspends: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn has_link(&self) -> bool {
        self.link.is_some()
    }

    /// Issues a link callback the way the PHY would on a cable event.
    pub(crate) fn notify<F: FnOnce(&dyn LinkClient)>(&self, f: F) {
        self.link.map(|link| f(*link));
    }

    pub(crate) fn suspends(&self) -> Vec<bool> {
        self.suspends.borrow().clone()
    }
}

impl<'a> Transceiver<'a> for FakeTransceiver<'a> {
    fn set_link_client(&self, client: Option<&'a dyn LinkClient>) {
        self.link.insert(client);
    }

    fn set_suspend(&self, suspend: bool) {
        self.suspends.borrow_mut().push(suspend);
    }
}

pub(crate) struct FakeCharger {
    kicks: RefCell<Vec<bool>>,
}

impl FakeCharger {
    pub(crate) fn kicks(&self) -> Vec<bool> {
        self.kicks.borrow().clone()
    }
}

impl Charger for FakeCharger {
    fn vbus_kick(&self, on: bool) {
        self.kicks.borrow_mut().push(on);
    }
}

pub(crate) struct FakeRootHub {
    polls: Cell<usize>,
}

impl FakeRootHub {
    pub(crate) fn polls(&self) -> usize {
        self.polls.get()
    }
}

impl RootHub for FakeRootHub {
    fn poll_status(&self) {
        self.polls.set(self.polls.get() + 1);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PmRequest {
    Latency(Option<u32>),
    Opp(u8),
}

pub(crate) struct FakePm {
    requests: RefCell<Vec<PmRequest>>,
}

impl FakePm {
    pub(crate) fn requests(&self) -> Vec<PmRequest> {
        self.requests.borrow().clone()
    }
}

impl PowerConstraints for FakePm {
    fn set_max_mpu_wakeup_lat(&self, latency_us: Option<u32>) {
        self.requests
            .borrow_mut()
            .push(PmRequest::Latency(latency_us));
    }

    fn set_vdd1_opp(&self, opp: u8) {
        self.requests.borrow_mut().push(PmRequest::Opp(opp));
    }
}

pub(crate) struct FakeLossCounter {
    count: Cell<u32>,
}

impl FakeLossCounter {
    /// Simulates the power domain going through OFF.
    pub(crate) fn lose_context(&self) {
        self.count.set(self.count.get() + 1);
    }
}

impl ContextLossCounter for FakeLossCounter {
    fn context_loss_count(&self) -> u32 {
        self.count.get()
    }
}

pub(crate) struct FakeClock {
    enabled: Cell<bool>,
    enables: Cell<usize>,
}

impl FakeClock {
    pub(crate) fn enables(&self) -> usize {
        self.enables.get()
    }
}

impl ClockInterface for FakeClock {
    fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    fn enable(&self) {
        self.enables.set(self.enables.get() + 1);
        self.enabled.set(true);
    }

    fn disable(&self) {
        self.enabled.set(false);
    }
}

pub(crate) type TestMusb = Omap2430Musb<'static, FakeMusb, FakeWrapper, FakeAlarm<'static>>;

/// Every piece of hardware and software the controller talks to.
pub(crate) struct Board {
    pub(crate) musb: FakeMusb,
    pub(crate) wrapper: FakeWrapper,
    pub(crate) alarm: FakeAlarm<'static>,
    pub(crate) xceiv: FakeTransceiver<'static>,
    pub(crate) charger: FakeCharger,
    pub(crate) root_hub: FakeRootHub,
    pub(crate) pm: FakePm,
    pub(crate) counter: FakeLossCounter,
    pub(crate) clock: FakeClock,
}

impl Board {
    pub(crate) fn build() -> &'static Board {
        Box::leak(Box::new(Board {
            musb: FakeMusb::new(),
            wrapper: FakeWrapper::new(),
            alarm: FakeAlarm::new(),
            xceiv: FakeTransceiver::new(),
            charger: FakeCharger {
                kicks: RefCell::new(Vec::new()),
            },
            root_hub: FakeRootHub {
                polls: Cell::new(0),
            },
            pm: FakePm {
                requests: RefCell::new(Vec::new()),
            },
            counter: FakeLossCounter {
                count: Cell::new(0),
            },
            clock: FakeClock {
                enabled: Cell::new(false),
                enables: Cell::new(0),
            },
        }))
    }

    pub(crate) fn clear_logs(&self) {
        self.musb.clear_log();
        self.wrapper.clear_log();
        self.charger.kicks.borrow_mut().clear();
        self.pm.requests.borrow_mut().clear();
        self.xceiv.suspends.borrow_mut().clear();
    }

    /// A controller wired to everything on this board, not yet initialized.
    pub(crate) fn controller(&'static self, platform: PlatformData) -> &'static TestMusb {
        let musb: &'static TestMusb = Box::leak(Box::new(Omap2430Musb::new(
            &self.musb,
            &self.wrapper,
            &self.alarm,
            platform,
        )));
        musb.set_transceiver(&self.xceiv);
        musb.set_charger(&self.charger);
        musb.set_root_hub(&self.root_hub);
        musb.set_power_constraints(&self.pm);
        musb.set_context_loss_counter(&self.counter);
        musb.set_clock(&self.clock);
        musb
    }

    /// An initialized controller with the bring-up accesses cleared.
    pub(crate) fn running(&'static self, platform: PlatformData) -> &'static TestMusb {
        let musb = self.controller(platform);
        musb.init().unwrap();
        self.clear_logs();
        musb
    }
}

/// An OTG-capable board on the given silicon with a ULPI transceiver.
pub(crate) fn platform(revision: SiliconRevision) -> PlatformData {
    PlatformData {
        board_mode: MusbMode::Otg,
        interface_type: InterfaceType::Ulpi,
        revision,
        capabilities: Capabilities::OTG,
        min_vdd1_opp: 1,
        max_vdd1_opp: 3,
        wrapper_restore: WrapperRestore::WithContext,
    }
}
