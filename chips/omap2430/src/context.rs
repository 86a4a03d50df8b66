// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Register snapshot taken before CORE OFF and written back after it.
//!
//! The MUSB core has no hardware save-and-restore on these parts. When the
//! cable goes away the controller may lose every register, so the glue
//! copies the global registers, the per-endpoint registers of all sixteen
//! `INDEX` banks, and the wrapper idle configuration into RAM.
//!
//! The dynamic FIFO registers (`TXFIFOSZ` .. `RXFIFOADD`) are read and
//! written while each endpoint is selected, but are treated as one shared
//! window: the snapshot only has to reproduce what the hardware showed.
//! `TXFIFOSZ` and `RXFIFOSZ` are byte registers that the snapshot reaches
//! with halfword accesses and truncates to their low byte. On restore the
//! sizes are written before the addresses, so any spill of the halfword
//! size writes into the neighbouring register is overwritten afterwards.

use log::trace;
use tock_registers::LocalRegisterCopy;

use crate::config::WrapperRestore;
use crate::regs::{
    self, ForceStandby, MusbCore, OtgWrapper, SysConfig, WrapperReg, NUM_ENDPOINTS,
};

/// Registers of one endpoint bank.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EndpointContext {
    pub txmaxp: u16,
    pub txcsr: u16,
    pub rxmaxp: u16,
    pub rxcsr: u16,
    pub rxcount: u16,
    pub txtype: u8,
    pub txinterval: u8,
    pub rxtype: u8,
    pub rxinterval: u8,
    pub txfifoadd: u16,
    pub rxfifoadd: u16,
    pub txfifosz: u8,
    pub rxfifosz: u8,
}

impl EndpointContext {
    const EMPTY: EndpointContext = EndpointContext {
        txmaxp: 0,
        txcsr: 0,
        rxmaxp: 0,
        rxcsr: 0,
        rxcount: 0,
        txtype: 0,
        txinterval: 0,
        rxtype: 0,
        rxinterval: 0,
        txfifoadd: 0,
        rxfifoadd: 0,
        txfifosz: 0,
        rxfifosz: 0,
    };
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterContext {
    /// Context-loss count of the power domain when the snapshot was taken
    off_counter: u32,
    otg_sysconfig: u32,
    otg_forcestandby: u32,

    faddr: u8,
    power: u8,
    intrtx: u16,
    intrrx: u16,
    intrtxe: u16,
    intrrxe: u16,
    intrusb: u8,
    intrusbe: u8,
    frame: u16,
    index: u8,
    testmode: u8,
    devctl: u8,

    endpoints: [EndpointContext; NUM_ENDPOINTS],
}

impl Default for RegisterContext {
    fn default() -> Self {
        RegisterContext::new()
    }
}

impl RegisterContext {
    pub const fn new() -> RegisterContext {
        RegisterContext {
            off_counter: 0,
            otg_sysconfig: 0,
            otg_forcestandby: 0,
            faddr: 0,
            power: 0,
            intrtx: 0,
            intrrx: 0,
            intrtxe: 0,
            intrrxe: 0,
            intrusb: 0,
            intrusbe: 0,
            frame: 0,
            index: 0,
            testmode: 0,
            devctl: 0,
            endpoints: [EndpointContext::EMPTY; NUM_ENDPOINTS],
        }
    }

    pub fn loss_count(&self) -> u32 {
        self.off_counter
    }

    pub fn endpoint(&self, index: usize) -> Option<&EndpointContext> {
        self.endpoints.get(index)
    }

    pub fn otg_sysconfig(&self) -> u32 {
        self.otg_sysconfig
    }

    pub fn otg_forcestandby(&self) -> u32 {
        self.otg_forcestandby
    }

    /// Snapshots the controller.
    ///
    /// The wrapper is first switched to no-standby/no-idle so the core keeps
    /// responding while it is read; the snapshot records that configuration.
    /// The FORCESTDBY snapshot never has `ENABLEFORCE` set, so a restore
    /// cannot assert MSTANDBY.
    pub fn save<M: MusbCore, W: OtgWrapper>(
        &mut self,
        musb: &M,
        wrapper: &W,
        loss_count: Option<u32>,
    ) {
        if let Some(count) = loss_count {
            self.off_counter = count;
        }

        let mut sysconfig =
            LocalRegisterCopy::<u32, SysConfig::Register>::new(wrapper.read(WrapperReg::SysConfig));
        sysconfig.modify(SysConfig::MIDLEMODE::NoStandby + SysConfig::SIDLEMODE::NoIdle);
        wrapper.write(WrapperReg::SysConfig, sysconfig.get());
        self.otg_sysconfig = sysconfig.get();

        let mut forcestdby = LocalRegisterCopy::<u32, ForceStandby::Register>::new(
            wrapper.read(WrapperReg::ForceStandby),
        );
        forcestdby.modify(ForceStandby::ENABLEFORCE::CLEAR);
        self.otg_forcestandby = forcestdby.get();

        self.faddr = musb.readb(regs::FADDR);
        self.power = musb.readb(regs::POWER);
        self.intrtx = musb.readw(regs::INTRTX);
        self.intrrx = musb.readw(regs::INTRRX);
        self.intrtxe = musb.readw(regs::INTRTXE);
        self.intrrxe = musb.readw(regs::INTRRXE);
        self.intrusb = musb.readb(regs::INTRUSB);
        self.intrusbe = musb.readb(regs::INTRUSBE);
        self.frame = musb.readw(regs::FRAME);
        self.index = musb.readb(regs::INDEX);
        self.testmode = musb.readb(regs::TESTMODE);
        self.devctl = musb.readb(regs::DEVCTL);

        for (i, ep) in self.endpoints.iter_mut().enumerate() {
            musb.writeb(regs::INDEX, i as u8);

            ep.txmaxp = musb.readw(regs::TXMAXP);
            ep.txcsr = musb.readw(regs::TXCSR);
            ep.rxmaxp = musb.readw(regs::RXMAXP);
            ep.rxcsr = musb.readw(regs::RXCSR);
            ep.rxcount = musb.readw(regs::RXCOUNT);
            ep.txtype = musb.readb(regs::TXTYPE);
            ep.txinterval = musb.readb(regs::TXINTERVAL);
            ep.rxtype = musb.readb(regs::RXTYPE);
            ep.rxinterval = musb.readb(regs::RXINTERVAL);

            ep.txfifoadd = musb.readw(regs::TXFIFOADD);
            ep.rxfifoadd = musb.readw(regs::RXFIFOADD);
            ep.txfifosz = musb.readw(regs::TXFIFOSZ) as u8;
            ep.rxfifosz = musb.readw(regs::RXFIFOSZ) as u8;
        }
        musb.writeb(regs::INDEX, self.index);

        trace!(
            "musb context saved, sysconfig {:08x} devctl {:02x}",
            self.otg_sysconfig,
            self.devctl
        );
    }

    /// Writes the snapshot back, leaving `INDEX` as it was saved.
    ///
    /// With [`WrapperRestore::ByLinkState`] the wrapper SYSCONFIG and
    /// FORCESTDBY are not touched.
    pub fn restore<M: MusbCore, W: OtgWrapper>(
        &self,
        musb: &M,
        wrapper: &W,
        wrapper_restore: WrapperRestore,
    ) {
        musb.writeb(regs::FADDR, self.faddr);
        musb.writeb(regs::POWER, self.power);
        musb.writew(regs::INTRTX, self.intrtx);
        musb.writew(regs::INTRRX, self.intrrx);
        musb.writew(regs::INTRTXE, self.intrtxe);
        musb.writew(regs::INTRRXE, self.intrrxe);
        musb.writeb(regs::INTRUSB, self.intrusb);
        musb.writeb(regs::INTRUSBE, self.intrusbe);
        musb.writew(regs::FRAME, self.frame);
        musb.writeb(regs::TESTMODE, self.testmode);
        musb.writeb(regs::DEVCTL, self.devctl);

        for (i, ep) in self.endpoints.iter().enumerate() {
            musb.writeb(regs::INDEX, i as u8);

            musb.writew(regs::TXMAXP, ep.txmaxp);
            musb.writew(regs::TXCSR, ep.txcsr);
            musb.writew(regs::RXMAXP, ep.rxmaxp);
            musb.writew(regs::RXCSR, ep.rxcsr);
            musb.writew(regs::RXCOUNT, ep.rxcount);
            musb.writeb(regs::TXTYPE, ep.txtype);
            musb.writeb(regs::TXINTERVAL, ep.txinterval);
            musb.writeb(regs::RXTYPE, ep.rxtype);
            musb.writeb(regs::RXINTERVAL, ep.rxinterval);

            musb.writew(regs::TXFIFOSZ, ep.txfifosz.into());
            musb.writew(regs::RXFIFOSZ, ep.rxfifosz.into());
            musb.writew(regs::TXFIFOADD, ep.txfifoadd);
            musb.writew(regs::RXFIFOADD, ep.rxfifoadd);
        }
        musb.writeb(regs::INDEX, self.index);

        if wrapper_restore == WrapperRestore::WithContext {
            wrapper.write(WrapperReg::SysConfig, self.otg_sysconfig);
            wrapper.write(WrapperReg::ForceStandby, self.otg_forcestandby);
        }

        trace!("musb context restored");
    }
}
