//! Attribute macros for cntryl-bench-registry.
//!
//! Each attribute leaves the function exactly as written and emits one static
//! entry into a linkme distributed slice. Entries are keyed by
//! `module_path!()::fn_name`, so attributes stacked on one function in any
//! order describe a single benchmark identity.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::punctuated::Punctuated;
use syn::{
    parse_macro_input, Expr, ExprArray, ExprLit, ExprUnary, FnArg, Ident, ItemFn, Lit, Token, Type,
    UnOp,
};

/// Mark a function as a benchmark.
///
/// # Example
///
/// ```rust,ignore
/// use cntryl_bench_registry::benchmark;
///
/// #[benchmark]
/// fn allocate_large_buffer() -> Vec<u8> {
///     vec![0u8; 10 * 1024 * 1024]
/// }
/// ```
///
/// Applying the attribute twice lists the function twice.
#[proc_macro_attribute]
pub fn benchmark(attr: TokenStream, item: TokenStream) -> TokenStream {
    let func = parse_macro_input!(item as ItemFn);
    expand(benchmark_impl(attr.into(), &func), &func)
}

/// Bind positional arguments to a function.
///
/// Values must be integer, float, bool or string literals, or arrays of
/// them. When stacked, the attribute nearest the function applies first and
/// the outermost one wins.
///
/// ```rust,ignore
/// #[benchmark]
/// #[param([0x1f, 0x8b, 0x08], "lz4", true)]
/// fn compress(input: &[u8], codec: &str, verify: bool) { /* ... */ }
/// ```
#[proc_macro_attribute]
pub fn param(attr: TokenStream, item: TokenStream) -> TokenStream {
    let func = parse_macro_input!(item as ItemFn);
    expand(param_impl(attr.into(), &func), &func)
}

/// Designate a setup routine.
///
/// - `#[case_setup]` - the function is its own setup routine
/// - `#[case_setup(target = other_fn)]` - the function sets up `other_fn`,
///   which must be defined in the same module
#[proc_macro_attribute]
pub fn case_setup(attr: TokenStream, item: TokenStream) -> TokenStream {
    let func = parse_macro_input!(item as ItemFn);
    expand(case_setup_impl(attr.into(), &func), &func)
}

/// Emit the untouched function followed by the generated entry. On error the
/// function is still emitted so call sites keep resolving.
fn expand(result: syn::Result<TokenStream2>, func: &ItemFn) -> TokenStream {
    let generated = result.unwrap_or_else(|e| e.to_compile_error());
    TokenStream::from(quote! {
        #func
        #generated
    })
}

fn validate_signature(func: &ItemFn) -> syn::Result<()> {
    let sig = &func.sig;
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "generic functions cannot be registered",
        ));
    }
    if let Some(asyncness) = &sig.asyncness {
        return Err(syn::Error::new_spanned(
            asyncness,
            "async functions cannot be registered",
        ));
    }
    if let Some(unsafety) = &sig.unsafety {
        return Err(syn::Error::new_spanned(
            unsafety,
            "unsafe functions cannot be registered",
        ));
    }
    if let Some(receiver) = sig.receiver() {
        return Err(syn::Error::new_spanned(
            receiver,
            "methods cannot be registered; use a free function",
        ));
    }
    if let Some(variadic) = &sig.variadic {
        return Err(syn::Error::new_spanned(
            variadic,
            "variadic functions cannot be registered",
        ));
    }
    for input in &sig.inputs {
        if let FnArg::Typed(arg) = input {
            if let Type::ImplTrait(ty) = arg.ty.as_ref() {
                return Err(syn::Error::new_spanned(
                    ty,
                    "impl Trait arguments cannot be registered",
                ));
            }
        }
    }
    Ok(())
}

fn key(name: &Ident) -> TokenStream2 {
    let name = name.to_string();
    quote! { ::core::concat!(::core::module_path!(), "::", #name) }
}

fn site() -> TokenStream2 {
    quote! {
        ::cntryl_bench_registry::__private::Site {
            file: ::core::file!(),
            line: ::core::line!(),
            column: ::core::column!(),
        }
    }
}

/// How an argument reaches the function once extracted into an owned local.
enum Passing {
    Value,
    Shared,
    Unique,
}

/// The owned type extracted for an argument. `&str` is read as `String` and
/// `&[T]` as `Vec<T>`; other references borrow an owned `T`.
fn owned_arg(ty: &Type) -> (TokenStream2, Passing) {
    match ty {
        Type::Group(g) => owned_arg(&g.elem),
        Type::Paren(p) => owned_arg(&p.elem),
        Type::Reference(r) => {
            let passing = if r.mutability.is_some() {
                Passing::Unique
            } else {
                Passing::Shared
            };
            let owned = match r.elem.as_ref() {
                Type::Path(p) if p.qself.is_none() && p.path.is_ident("str") => {
                    quote!(::std::string::String)
                }
                Type::Slice(slice) => {
                    let elem = &slice.elem;
                    quote!(::std::vec::Vec<#elem>)
                }
                other => quote!(#other),
            };
            (owned, passing)
        }
        other => (quote!(#other), Passing::Value),
    }
}

/// A function item building the handle for `func`.
///
/// Each bound value is converted into an owned local before the call, so
/// borrowed arguments and any number of arguments are accepted. Conversion
/// failures surface when the handle is called.
fn make_fn(fn_ident: &Ident, func: &ItemFn) -> TokenStream2 {
    let private = quote!(::cntryl_bench_registry::__private);
    let name = &func.sig.ident;
    let key = key(name);
    let arity = func.sig.inputs.len();

    let mut locals = Vec::with_capacity(arity);
    let mut passed = Vec::with_capacity(arity);
    for (index, input) in func.sig.inputs.iter().enumerate() {
        let FnArg::Typed(arg) = input else {
            continue;
        };
        let local = format_ident!("__cntryl_arg{}", index);
        let (owned, passing) = owned_arg(&arg.ty);
        let (binding, pass) = match passing {
            Passing::Value => (quote!(#local), quote!(#local)),
            Passing::Shared => (quote!(#local), quote!(&#local)),
            Passing::Unique => (quote!(mut #local), quote!(&mut #local)),
        };
        locals.push(quote! {
            let #binding: #owned = #private::arg(#key, __cntryl_params, #index)?;
        });
        passed.push(pass);
    }

    quote! {
        fn #fn_ident() -> #private::BenchFn {
            #private::BenchFn::with_arity(
                #key,
                #arity,
                |__cntryl_params: &#private::Params| -> ::core::result::Result<(), #private::InvokeError> {
                    #private::check_arity(#key, #arity, __cntryl_params)?;
                    #(#locals)*
                    ::core::hint::black_box(#name(#(#passed),*));
                    ::core::result::Result::Ok(())
                },
            )
        }
    }
}

/// A function item building the handle for a setup target that carries no
/// attribute of its own. Its signature is unknown here, so the handle fails
/// when called; a `#[benchmark]` or `#[param]` on the target supplies the
/// real one.
fn target_fn(fn_ident: &Ident, target: &Ident) -> TokenStream2 {
    let private = quote!(::cntryl_bench_registry::__private);
    let key = key(target);
    quote! {
        fn #fn_ident() -> #private::BenchFn {
            let _ = #target;
            #private::BenchFn::raw(#key, |_: &#private::Params| {
                ::core::result::Result::Err(#private::InvokeError::failed(
                    #key,
                    "declared only as a setup target",
                ))
            })
        }
    }
}

fn no_arguments(attr: TokenStream2, name: &str) -> syn::Result<()> {
    if attr.is_empty() {
        Ok(())
    } else {
        Err(syn::Error::new_spanned(
            attr,
            format!("#[{name}] takes no arguments"),
        ))
    }
}

fn benchmark_impl(attr: TokenStream2, func: &ItemFn) -> syn::Result<TokenStream2> {
    no_arguments(attr, "benchmark")?;
    validate_signature(func)?;

    let name = &func.sig.ident;
    let make = make_fn(&Ident::new("__cntryl_make", name.span()), func);
    let key = key(name);
    let site = site();

    Ok(quote! {
        const _: () = {
            #make

            #[::cntryl_bench_registry::__private::linkme::distributed_slice(::cntryl_bench_registry::__private::BENCHMARKS)]
            #[linkme(crate = ::cntryl_bench_registry::__private::linkme)]
            static __CNTRYL_BENCHMARK: ::cntryl_bench_registry::__private::BenchmarkEntry =
                ::cntryl_bench_registry::__private::BenchmarkEntry {
                    key: #key,
                    make: __cntryl_make,
                    site: #site,
                };
        };
    })
}

fn param_impl(attr: TokenStream2, func: &ItemFn) -> syn::Result<TokenStream2> {
    validate_signature(func)?;

    let args = syn::parse::Parser::parse2(Punctuated::<Expr, Token![,]>::parse_terminated, attr)?;
    let values = args
        .iter()
        .map(param_value)
        .collect::<syn::Result<Vec<_>>>()?;
    let count = values.len();

    // Attributes nested below this one have already been written closer to
    // the function, so they apply first.
    let rank = func
        .attrs
        .iter()
        .filter(|a| a.path().segments.last().is_some_and(|s| s.ident == "param"))
        .count() as u32;

    let name = &func.sig.ident;
    let make = make_fn(&Ident::new("__cntryl_make", name.span()), func);
    let key = key(name);
    let site = site();

    Ok(quote! {
        const _: () = {
            #make

            static __CNTRYL_VALUES: [::cntryl_bench_registry::__private::ParamValue; #count] = [#(#values),*];

            #[::cntryl_bench_registry::__private::linkme::distributed_slice(::cntryl_bench_registry::__private::PARAMS)]
            #[linkme(crate = ::cntryl_bench_registry::__private::linkme)]
            static __CNTRYL_PARAM: ::cntryl_bench_registry::__private::ParamEntry =
                ::cntryl_bench_registry::__private::ParamEntry {
                    key: #key,
                    make: __cntryl_make,
                    values: &__CNTRYL_VALUES,
                    rank: #rank,
                    site: #site,
                };
        };
    })
}

/// Lower a literal expression to a const `ParamValue` constructor.
fn param_value(expr: &Expr) -> syn::Result<TokenStream2> {
    let value = quote!(::cntryl_bench_registry::__private::ParamValue);
    match expr {
        Expr::Group(g) => param_value(&g.expr),
        Expr::Paren(p) => param_value(&p.expr),
        Expr::Lit(ExprLit { lit, .. }) => match lit {
            Lit::Int(i) => {
                if let Ok(v) = i.base10_parse::<i64>() {
                    Ok(quote! { #value::Int(#v) })
                } else {
                    let v = i.base10_parse::<u64>()?;
                    Ok(quote! { #value::UInt(#v) })
                }
            }
            Lit::Float(f) => {
                let v = finite(expr, f.base10_parse::<f64>()?)?;
                Ok(quote! { #value::Float(#v) })
            }
            Lit::Bool(b) => {
                let v = b.value;
                Ok(quote! { #value::Bool(#v) })
            }
            Lit::Str(s) => Ok(quote! {
                #value::Str(::cntryl_bench_registry::__private::Cow::Borrowed(#s))
            }),
            other => Err(unsupported(other)),
        },
        Expr::Array(ExprArray { elems, .. }) => {
            let items = elems
                .iter()
                .map(param_value)
                .collect::<syn::Result<Vec<_>>>()?;
            let count = items.len();
            Ok(quote! {
                #value::List(::cntryl_bench_registry::__private::Cow::Borrowed({
                    static __CNTRYL_ITEMS: [#value; #count] = [#(#items),*];
                    &__CNTRYL_ITEMS
                }))
            })
        }
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr: inner,
            ..
        }) => match inner.as_ref() {
            Expr::Lit(ExprLit { lit: Lit::Int(i), .. }) => {
                let magnitude = i.base10_parse::<u64>()? as i128;
                let v = i64::try_from(-magnitude)
                    .map_err(|_| syn::Error::new_spanned(expr, "integer does not fit in i64"))?;
                Ok(quote! { #value::Int(#v) })
            }
            Expr::Lit(ExprLit { lit: Lit::Float(f), .. }) => {
                let v = -finite(expr, f.base10_parse::<f64>()?)?;
                Ok(quote! { #value::Float(#v) })
            }
            _ => Err(unsupported(expr)),
        },
        _ => Err(unsupported(expr)),
    }
}

fn finite(expr: &Expr, v: f64) -> syn::Result<f64> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(syn::Error::new_spanned(expr, "float must be finite"))
    }
}

fn unsupported(tokens: impl quote::ToTokens) -> syn::Error {
    syn::Error::new_spanned(
        tokens,
        "param values must be integer, float, bool or string literals, or arrays of them",
    )
}

fn case_setup_impl(attr: TokenStream2, func: &ItemFn) -> syn::Result<TokenStream2> {
    validate_signature(func)?;

    let mut target: Option<Ident> = None;
    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("target") {
            target = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            let name = meta
                .path
                .get_ident()
                .map(|i| i.to_string())
                .unwrap_or_default();
            Err(meta.error(format!("unknown attribute: {}", name)))
        }
    });
    syn::parse::Parser::parse2(parser, attr)?;

    let name = &func.sig.ident;
    let target = target.unwrap_or_else(|| name.clone());
    let make = make_fn(&Ident::new("__cntryl_make", name.span()), func);
    let make_target = if target == *name {
        make_fn(&Ident::new("__cntryl_make_target", target.span()), func)
    } else {
        target_fn(&Ident::new("__cntryl_make_target", target.span()), &target)
    };
    let target_key = key(&target);
    let setup_key = key(name);
    let site = site();

    Ok(quote! {
        const _: () = {
            #make
            #make_target

            #[::cntryl_bench_registry::__private::linkme::distributed_slice(::cntryl_bench_registry::__private::SETUPS)]
            #[linkme(crate = ::cntryl_bench_registry::__private::linkme)]
            static __CNTRYL_SETUP: ::cntryl_bench_registry::__private::SetupEntry =
                ::cntryl_bench_registry::__private::SetupEntry {
                    target: #target_key,
                    make_target: __cntryl_make_target,
                    key: #setup_key,
                    make: __cntryl_make,
                    site: #site,
                };
        };
    })
}
