// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Vigil

//! Behavior test suite for the hook dispatch engine. See `tests/`.
