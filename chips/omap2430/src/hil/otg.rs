// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Interfaces between the MUSB glue and the OTG transceiver, the PMIC
//! charger logic and the host-side root hub.

/// The OTG transceiver (for OMAP3 boards, the TWL4030 USB PHY).
///
/// The transceiver sees cable attach/detach first and calls back into its
/// link client to save, restore and force the controller active.
pub trait Transceiver<'a> {
    /// Registers (or with `None`, unregisters) the controller that handles
    /// link callbacks.
    fn set_link_client(&self, client: Option<&'a dyn LinkClient>);

    /// Tells the transceiver the controller is entering (`true`) or leaving
    /// (`false`) system suspend.
    fn set_suspend(&self, suspend: bool);
}

/// Link callbacks issued by the transceiver.
pub trait LinkClient {
    /// Cable detached: the controller may lose its registers from now on.
    fn save_context(&self);

    /// Cable attached: the controller must be fully operational again.
    fn restore_context(&self);

    /// Keeps the controller out of (`true`) or allows it into (`false`)
    /// idle/standby.
    fn force_active(&self, enable: bool);
}

/// Charger detection in the PMIC, told whenever VBUS is forced on or off.
pub trait Charger {
    fn vbus_kick(&self, on: bool);
}

/// Host-side root hub emulation, asked to poll the root port after the glue
/// changes its status bits.
pub trait RootHub {
    fn poll_status(&self);
}
