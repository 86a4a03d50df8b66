// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! MUSB core and OMAP OTG wrapper registers.
//!
//! The MUSB core is reached by byte offset: the endpoint registers at 0x10
//! are banked by `INDEX`, and the dynamic FIFO registers are accessed with
//! mixed widths, so a typed struct does not describe it well. The OTG
//! wrapper is an ordinary 32-bit register block.

use core::ptr;

use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

// Common USB registers
pub const FADDR: usize = 0x00;
pub const POWER: usize = 0x01;
pub const INTRTX: usize = 0x02;
pub const INTRRX: usize = 0x04;
pub const INTRTXE: usize = 0x06;
pub const INTRRXE: usize = 0x08;
pub const INTRUSB: usize = 0x0A;
pub const INTRUSBE: usize = 0x0B;
pub const FRAME: usize = 0x0C;
pub const INDEX: usize = 0x0E;
pub const TESTMODE: usize = 0x0F;

/// Start of the window banked by `INDEX`.
const INDEXED: usize = 0x10;

// Endpoint registers, valid for the endpoint selected in `INDEX`
pub const TXMAXP: usize = INDEXED + 0x00;
pub const TXCSR: usize = INDEXED + 0x02;
pub const RXMAXP: usize = INDEXED + 0x04;
pub const RXCSR: usize = INDEXED + 0x06;
pub const RXCOUNT: usize = INDEXED + 0x08;
pub const TXTYPE: usize = INDEXED + 0x0A;
pub const TXINTERVAL: usize = INDEXED + 0x0B;
pub const RXTYPE: usize = INDEXED + 0x0C;
pub const RXINTERVAL: usize = INDEXED + 0x0D;

// OTG and dynamic FIFO registers
pub const DEVCTL: usize = 0x60;
pub const TXFIFOSZ: usize = 0x62;
pub const RXFIFOSZ: usize = 0x63;
pub const TXFIFOADD: usize = 0x64;
pub const RXFIFOADD: usize = 0x66;

/// Number of endpoint slots in this MUSB configuration.
pub const NUM_ENDPOINTS: usize = 16;

register_bitfields![u8,
    pub Power [
        ISOUPDATE 7,
        SOFTCONN 6,
        HSENAB 5,
        HSMODE 4,
        RESET 3,
        RESUME 2,
        SUSPENDM 1,
        ENSUSPEND 0
    ],

    pub DevCtl [
        /// Set while the controller is the B device
        BDEVICE OFFSET(7) NUMBITS(1) [],
        FSDEV OFFSET(6) NUMBITS(1) [],
        LSDEV OFFSET(5) NUMBITS(1) [],
        VBUS OFFSET(3) NUMBITS(2) [
            BelowSessionEnd = 0,
            AboveSessionEnd = 1,
            AboveAValid = 2,
            AboveVBusValid = 3
        ],
        /// Host mode
        HM OFFSET(2) NUMBITS(1) [],
        /// Host request
        HR OFFSET(1) NUMBITS(1) [],
        SESSION OFFSET(0) NUMBITS(1) []
    ]
];

register_bitfields![u32,
    pub SysConfig [
        /// Initiator (master) standby behaviour
        MIDLEMODE OFFSET(12) NUMBITS(2) [
            ForceStandby = 0,
            NoStandby = 1,
            SmartStandby = 2
        ],
        /// Target (slave) idle behaviour
        SIDLEMODE OFFSET(3) NUMBITS(2) [
            ForceIdle = 0,
            NoIdle = 1,
            SmartIdle = 2
        ],
        ENABLEWAKEUP OFFSET(2) NUMBITS(1) [],
        SOFTRST OFFSET(1) NUMBITS(1) [],
        AUTOIDLE OFFSET(0) NUMBITS(1) []
    ],

    pub SysStatus [
        RESETDONE OFFSET(0) NUMBITS(1) []
    ],

    pub InterfSel [
        PHYSEL OFFSET(0) NUMBITS(3) [
            Utmi8Bit = 0,
            Ulpi12Pin = 1,
            Ulpi8Pin = 2
        ]
    ],

    pub ForceStandby [
        /// Asserts MSTANDBY towards the PRCM
        ENABLEFORCE OFFSET(0) NUMBITS(1) []
    ]
];

/// Byte-addressed access to the MUSB core registers.
pub trait MusbCore {
    fn readb(&self, offset: usize) -> u8;
    fn readw(&self, offset: usize) -> u16;
    fn writeb(&self, offset: usize, val: u8);
    fn writew(&self, offset: usize, val: u16);
}

/// Registers of the OMAP OTG wrapper around the MUSB core.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WrapperReg {
    Revision,
    SysConfig,
    SysStatus,
    InterfSel,
    SimEnable,
    ForceStandby,
}

pub trait OtgWrapper {
    fn read(&self, reg: WrapperReg) -> u32;
    fn write(&self, reg: WrapperReg, val: u32);
}

/// Memory-mapped MUSB core.
pub struct MusbCoreMmio {
    base: *mut u8,
}

impl MusbCoreMmio {
    /// # Safety
    ///
    /// `base` must be the address of the MUSB register window, mapped for
    /// the lifetime of the returned value.
    pub const unsafe fn new(base: usize) -> MusbCoreMmio {
        MusbCoreMmio {
            base: base as *mut u8,
        }
    }
}

impl MusbCore for MusbCoreMmio {
    fn readb(&self, offset: usize) -> u8 {
        unsafe { ptr::read_volatile(self.base.add(offset)) }
    }

    fn readw(&self, offset: usize) -> u16 {
        if offset & 1 != 0 {
            // Unaligned halfword: split into two byte accesses.
            return u16::from_le_bytes([self.readb(offset), self.readb(offset + 1)]);
        }
        unsafe { ptr::read_volatile(self.base.add(offset).cast::<u16>()) }
    }

    fn writeb(&self, offset: usize, val: u8) {
        unsafe { ptr::write_volatile(self.base.add(offset), val) }
    }

    fn writew(&self, offset: usize, val: u16) {
        if offset & 1 != 0 {
            let [lo, hi] = val.to_le_bytes();
            self.writeb(offset, lo);
            self.writeb(offset + 1, hi);
            return;
        }
        unsafe { ptr::write_volatile(self.base.add(offset).cast::<u16>(), val) }
    }
}

register_structs! {
    /// OMAP OTG wrapper
    OtgWrapperRegisters {
        (0x000 => revision: ReadOnly<u32>),
        (0x004 => sysconfig: ReadWrite<u32, SysConfig::Register>),
        (0x008 => sysstatus: ReadOnly<u32, SysStatus::Register>),
        (0x00C => interfsel: ReadWrite<u32, InterfSel::Register>),
        (0x010 => simenable: ReadWrite<u32>),
        (0x014 => forcestdby: ReadWrite<u32, ForceStandby::Register>),
        (0x018 => @END),
    }
}

/// Memory-mapped OTG wrapper.
pub struct OtgWrapperMmio {
    registers: *const OtgWrapperRegisters,
}

impl OtgWrapperMmio {
    /// # Safety
    ///
    /// `base` must be the address of the OTG wrapper block (MUSB base +
    /// 0x400 on OMAP2430/OMAP3), mapped for the lifetime of the returned
    /// value.
    pub const unsafe fn new(base: usize) -> OtgWrapperMmio {
        OtgWrapperMmio {
            registers: base as *const OtgWrapperRegisters,
        }
    }

    fn registers(&self) -> &OtgWrapperRegisters {
        unsafe { &*self.registers }
    }
}

impl OtgWrapper for OtgWrapperMmio {
    fn read(&self, reg: WrapperReg) -> u32 {
        let regs = self.registers();
        match reg {
            WrapperReg::Revision => regs.revision.get(),
            WrapperReg::SysConfig => regs.sysconfig.get(),
            WrapperReg::SysStatus => regs.sysstatus.get(),
            WrapperReg::InterfSel => regs.interfsel.get(),
            WrapperReg::SimEnable => regs.simenable.get(),
            WrapperReg::ForceStandby => regs.forcestdby.get(),
        }
    }

    fn write(&self, reg: WrapperReg, val: u32) {
        let regs = self.registers();
        match reg {
            WrapperReg::SysConfig => regs.sysconfig.set(val),
            WrapperReg::InterfSel => regs.interfsel.set(val),
            WrapperReg::SimEnable => regs.simenable.set(val),
            WrapperReg::ForceStandby => regs.forcestdby.set(val),
            // Read-only
            WrapperReg::Revision | WrapperReg::SysStatus => {}
        }
    }
}
