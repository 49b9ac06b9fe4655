// SPDX-License-Identifier: MIT

pub mod standardpool;
