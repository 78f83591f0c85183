/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use proc_macro::TokenStream;

use quote::quote;
use syn::{parse_macro_input, ItemFn, LitInt};

/// Runs an `async fn` test on a dedicated multi-threaded Tokio runtime.
///
/// Tracked work is spawned onto the runtime, so a panic inside it never reaches
/// the test body directly. The generated test installs a panic hook and fails
/// if any panic was observed while the body ran, even one swallowed by a task.
///
/// Accepts an optional `worker_threads = N` argument.
#[proc_macro_attribute]
pub fn waitfor_test(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut worker_threads: Option<usize> = None;
    let attr_parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("worker_threads") {
            let value: LitInt = meta.value()?.parse()?;
            worker_threads = Some(value.base10_parse()?);
            Ok(())
        } else {
            Err(meta.error("unsupported waitfor_test argument"))
        }
    });
    parse_macro_input!(attr with attr_parser);

    let input = parse_macro_input!(item as ItemFn);
    let vis = &input.vis;
    let sig = &input.sig;
    let body = &input.block;
    let attrs = &input.attrs;
    let name = &sig.ident;
    let inputs = &sig.inputs;
    let output = &sig.output;

    let async_name = syn::Ident::new(&format!("__{name}_async"), name.span());

    let worker_threads = worker_threads.map(|n| quote! { builder.worker_threads(#n); });

    let expanded = quote! {
        #[test]
        #(#attrs)*
        #vis fn #name() {
            use std::sync::atomic::{AtomicBool, Ordering};
            use std::sync::Arc;
            use std::panic;
            use ::waitfor_test::__private::{parking_lot, tokio, tracing};

            #[derive(Clone, Default)]
            struct PanicInfo {
                occurred: Arc<AtomicBool>,
                message: Arc<parking_lot::Mutex<Option<String>>>,
                location: Arc<parking_lot::Mutex<Option<String>>>,
            }

            let panic_info = PanicInfo::default();
            let panic_info_clone = panic_info.clone();

            let orig_hook = panic::take_hook();
            panic::set_hook(Box::new(move |info| {
                panic_info_clone.occurred.store(true, Ordering::SeqCst);
                let message = info
                    .payload()
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| info.payload().downcast_ref::<String>().cloned());
                *panic_info_clone.message.lock() = message.clone();
                *panic_info_clone.location.lock() = info
                    .location()
                    .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()));
                let cleaned = message
                    .unwrap_or_else(|| "No error message".to_string())
                    .trim()
                    .replace('\n', " ");
                tracing::error!("Panic: {}", cleaned);
                orig_hook(info);
            }));

            let mut builder = tokio::runtime::Builder::new_multi_thread();
            #worker_threads
            let runtime = builder
                .enable_all()
                .build()
                .expect("failed to build the waitfor_test runtime");

            let result = runtime.block_on(async {
                let test_span = tracing::info_span!("waitfor_test", name = stringify!(#name));
                let _enter = test_span.enter();

                #async_name().await
            });
            drop(runtime);

            if panic_info.occurred.load(Ordering::SeqCst) {
                let message = panic_info.message.lock().clone();
                let location = panic_info
                    .location
                    .lock()
                    .clone()
                    .unwrap_or_else(|| "unknown location".to_string());
                let cleaned = message
                    .unwrap_or_else(|| "No error message".to_string())
                    .trim()
                    .replace('\n', " ");
                panic!("Panic at {}: {}", location, cleaned);
            }

            result.unwrap()
        }

        async fn #async_name(#inputs) #output #body
    };

    expanded.into()
}
