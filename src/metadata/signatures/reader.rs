use tracing::warn;

use crate::{
    file::parser::Parser,
    metadata::{
        entities::TypeDefOrRef,
        signatures::{
            CallingConvention, CallingConventionSig, CorLibTypes, FieldSig, GenericInstMethodSig,
            LocalSig, MethodBaseSig, TypeSig, ELEMENT_TYPE,
        },
        token::Token,
    },
    Error::{NotSupported, RecursionLimit},
    Result,
};

/// What the signature reader needs from its module
pub trait SignatureContext {
    /// The shared primitive types
    fn corlib_types(&self) -> &CorLibTypes;

    /// Resolve a `TypeDef`, `TypeRef` or `TypeSpec` token
    fn resolve_type_def_or_ref(&self, token: Token) -> Option<TypeDefOrRef>;
}

/// Decoder of signature blobs.
///
/// ```rust,ignore
/// let sig = SignatureReader::read(&module, &[0x20, 0x01, 0x01, 0x08], 50);
/// ```
///
/// A reader decodes exactly one signature; create a new one per blob.
pub struct SignatureReader<'a, C: SignatureContext + ?Sized> {
    parser: Parser<'a>,
    context: &'a C,
    depth: usize,
    max_depth: usize,
}

impl<'a, C: SignatureContext + ?Sized> SignatureReader<'a, C> {
    /// Create a reader over the payload of a signature blob
    #[must_use]
    pub fn new(context: &'a C, data: &'a [u8], max_depth: usize) -> Self {
        SignatureReader {
            parser: Parser::new(data),
            context,
            depth: 0,
            max_depth,
        }
    }

    /// Decode a signature, `None` if it is invalid or not supported
    #[must_use]
    pub fn read(context: &'a C, data: &'a [u8], max_depth: usize) -> Option<CallingConventionSig> {
        match SignatureReader::new(context, data, max_depth).read_sig() {
            Ok(sig) => Some(sig),
            Err(error) => {
                warn!(%error, "rejecting signature");
                None
            }
        }
    }

    /// Decode a `TypeSpec` blob, which is a single type
    #[must_use]
    pub fn read_type_spec(context: &'a C, data: &'a [u8], max_depth: usize) -> Option<TypeSig> {
        match SignatureReader::new(context, data, max_depth).read_type() {
            Ok(sig) => Some(sig),
            Err(error) => {
                warn!(%error, "rejecting type signature");
                None
            }
        }
    }

    /// Decode a signature starting with its calling convention
    ///
    /// # Errors
    /// Returns an error for truncated or structurally invalid data, unsupported element types
    /// and calling conventions, unresolvable type tokens and nesting beyond the depth limit.
    pub fn read_sig(&mut self) -> Result<CallingConventionSig> {
        let calling_convention = CallingConvention(self.parser.read_le::<u8>()?);

        match calling_convention.kind() {
            CallingConvention::DEFAULT
            | CallingConvention::C
            | CallingConvention::STDCALL
            | CallingConvention::THISCALL
            | CallingConvention::FASTCALL
            | CallingConvention::VARARG => Ok(CallingConventionSig::Method(
                self.read_method_base(calling_convention)?,
            )),
            CallingConvention::FIELD => Ok(CallingConventionSig::Field(FieldSig {
                calling_convention,
                field_type: self.read_type()?,
            })),
            CallingConvention::LOCAL_SIG => {
                let count = self.read_count()?;
                let mut locals = Vec::with_capacity(count);
                for _ in 0..count {
                    locals.push(self.read_type()?);
                }

                Ok(CallingConventionSig::LocalSig(LocalSig {
                    calling_convention,
                    locals,
                }))
            }
            CallingConvention::PROPERTY => Ok(CallingConventionSig::Property(
                self.read_method_base(calling_convention)?,
            )),
            CallingConvention::GENERIC_INST => {
                let count = self.read_count()?;
                let mut generic_args = Vec::with_capacity(count);
                for _ in 0..count {
                    generic_args.push(self.read_type()?);
                }

                Ok(CallingConventionSig::GenericInstMethod(GenericInstMethodSig {
                    calling_convention,
                    generic_args,
                }))
            }
            _ => Err(NotSupported),
        }
    }

    fn read_method_base(&mut self, calling_convention: CallingConvention) -> Result<MethodBaseSig> {
        let generic_param_count = if calling_convention.is_generic() {
            self.parser.read_compressed_uint()?
        } else {
            0
        };

        let count = self.read_count()?;
        let ret_type = self.read_type()?;

        let mut params = Vec::with_capacity(count);
        let mut params_after_sentinel: Option<Vec<TypeSig>> = None;

        let mut read = 0;
        while read < count {
            if self.parser.peek_byte()? == ELEMENT_TYPE::SENTINEL {
                self.parser.advance()?;
                if params_after_sentinel.is_none() {
                    params_after_sentinel = Some(Vec::with_capacity(count - read));
                }
                continue;
            }

            let param = self.read_type()?;
            match params_after_sentinel.as_mut() {
                Some(after) => after.push(param),
                None => params.push(param),
            }
            read += 1;
        }

        Ok(MethodBaseSig {
            calling_convention,
            generic_param_count,
            ret_type,
            params,
            params_after_sentinel,
        })
    }

    /// Read an element count, bounded by the bytes left so that bogus counts cannot allocate
    fn read_count(&mut self) -> Result<usize> {
        let count = self.parser.read_compressed_uint()? as usize;
        let remaining = self.parser.len() - self.parser.pos();
        if count > remaining {
            return Err(malformed_error!(
                "Signature claims {} elements with {} bytes left",
                count,
                remaining
            ));
        }

        Ok(count)
    }

    /// Decode one type
    ///
    /// # Errors
    /// See [`SignatureReader::read_sig`].
    pub fn read_type(&mut self) -> Result<TypeSig> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(RecursionLimit(self.max_depth));
        }

        let result = self.read_type_inner();
        self.depth -= 1;
        result
    }

    fn read_type_inner(&mut self) -> Result<TypeSig> {
        let element_type = self.parser.read_le::<u8>()?;
        match element_type {
            ELEMENT_TYPE::VOID
            | ELEMENT_TYPE::BOOLEAN
            | ELEMENT_TYPE::CHAR
            | ELEMENT_TYPE::I1
            | ELEMENT_TYPE::U1
            | ELEMENT_TYPE::I2
            | ELEMENT_TYPE::U2
            | ELEMENT_TYPE::I4
            | ELEMENT_TYPE::U4
            | ELEMENT_TYPE::I8
            | ELEMENT_TYPE::U8
            | ELEMENT_TYPE::R4
            | ELEMENT_TYPE::R8
            | ELEMENT_TYPE::STRING
            | ELEMENT_TYPE::TYPEDBYREF
            | ELEMENT_TYPE::I
            | ELEMENT_TYPE::U
            | ELEMENT_TYPE::OBJECT => self
                .context
                .corlib_types()
                .sig(element_type)
                .ok_or(NotSupported),
            ELEMENT_TYPE::PTR => Ok(TypeSig::Ptr(Box::new(self.read_type()?))),
            ELEMENT_TYPE::BYREF => Ok(TypeSig::ByRef(Box::new(self.read_type()?))),
            ELEMENT_TYPE::SZARRAY => Ok(TypeSig::SzArray(Box::new(self.read_type()?))),
            ELEMENT_TYPE::PINNED => Ok(TypeSig::Pinned(Box::new(self.read_type()?))),
            // Within parameter lists the sentinel is consumed by `read_method_base`
            ELEMENT_TYPE::SENTINEL => Ok(TypeSig::Sentinel(Box::new(self.read_type()?))),
            ELEMENT_TYPE::VALUETYPE => Ok(TypeSig::ValueType(self.read_type_def_or_ref()?)),
            ELEMENT_TYPE::CLASS => Ok(TypeSig::Class(self.read_type_def_or_ref()?)),
            ELEMENT_TYPE::CMOD_REQD => {
                let modifier = self.read_type_def_or_ref()?;
                Ok(TypeSig::CModReqd {
                    modifier,
                    next: Box::new(self.read_type()?),
                })
            }
            ELEMENT_TYPE::CMOD_OPT => {
                let modifier = self.read_type_def_or_ref()?;
                Ok(TypeSig::CModOpt {
                    modifier,
                    next: Box::new(self.read_type()?),
                })
            }
            ELEMENT_TYPE::VAR => Ok(TypeSig::Var(self.parser.read_compressed_uint()?)),
            ELEMENT_TYPE::MVAR => Ok(TypeSig::MVar(self.parser.read_compressed_uint()?)),
            ELEMENT_TYPE::VALUEARRAY => {
                let next = Box::new(self.read_type()?);
                Ok(TypeSig::ValueArray {
                    next,
                    size: self.parser.read_compressed_uint()?,
                })
            }
            ELEMENT_TYPE::MODULE => {
                let index = self.parser.read_compressed_uint()?;
                Ok(TypeSig::Module {
                    index,
                    next: Box::new(self.read_type()?),
                })
            }
            // ARRAY, GENERICINST, FNPTR, R, INTERNAL, END and anything unknown
            _ => Err(malformed_error!(
                "Unsupported ELEMENT_TYPE - 0x{:02x}",
                element_type
            )),
        }
    }

    fn read_type_def_or_ref(&mut self) -> Result<TypeDefOrRef> {
        let token = self.parser.read_compressed_token()?;
        self.context
            .resolve_type_def_or_ref(token)
            .ok_or_else(|| malformed_error!("Unresolved type token - {}", token))
    }
}
