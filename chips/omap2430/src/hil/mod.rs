// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Interfaces to the collaborators the glue drives but does not own.

pub mod otg;
pub mod pm;
pub mod time;
