// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Endpoint handlers.

pub mod analysis;
pub mod health;
pub mod run;
