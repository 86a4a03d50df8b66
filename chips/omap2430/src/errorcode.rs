// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Error codes returned by the glue.

use core::fmt;

/// Failures the glue reports to its callers.
///
/// Register access is memory mapped and never fails, so apart from alarm
/// bookkeeping only configuration problems surface here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(usize)]
pub enum ErrorCode {
    /// Generic failure condition
    FAIL = 0,
    /// An invalid parameter was passed, or the request is not permitted by
    /// the board configuration
    INVAL = 5,
    /// A required device (the OTG transceiver) is not present
    NODEVICE = 10,
}

impl From<ErrorCode> for usize {
    fn from(err: ErrorCode) -> usize {
        err as usize
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = match self {
            ErrorCode::FAIL => "failure",
            ErrorCode::INVAL => "invalid argument",
            ErrorCode::NODEVICE => "no such device",
        };
        f.write_str(msg)
    }
}
