// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::future::Future;
use std::io;

/// Drive `future` to completion on a multi-thread runtime, then shut the
/// runtime down without joining its blocking pool.
///
/// Reads abandoned by the per-attempt deadline may never return on a hung
/// mount, so the process must not wait for them on the way out.
pub fn block_on<F: Future>(future: F) -> io::Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let output = runtime.block_on(future);
    runtime.shutdown_background();
    Ok(output)
}
