use crate::api::{AnonymousBinding, FieldError};
use crate::error::{ConfigError, ErrorCategory, ParseError};
use crate::matcher::{classify, Bound, LongResolution, NameTable, TokenKind};
use crate::model::{Arity, CancelMode, Descriptor, DuplicatePolicy, Nargs, ParsingMode};
use crate::parser::session::{Outcome, ParseSession};
use crate::text::Messages;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

// We need a (dyn .. [ignoring T] ..) here in order to put all the bindings of varying
// types T under one collection.  The typed layer lives at the bottom of the object graph;
// up here the engine works across all T.
pub(crate) type BoundArgument<'a> = (Descriptor, Box<dyn AnonymousBinding<'a> + 'a>);

pub(crate) struct Engine<'a> {
    mode: ParsingMode,
    duplicates: DuplicatePolicy,
    descriptors: Vec<Descriptor>,
    bindings: Vec<Box<dyn AnonymousBinding<'a> + 'a>>,
    names: NameTable,
    positionals: Vec<usize>,
}

impl<'a> std::fmt::Debug for Engine<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine{..}").finish()
    }
}

impl<'a> Engine<'a> {
    pub(crate) fn new(
        mode: ParsingMode,
        duplicates: DuplicatePolicy,
        prefix_aliases: bool,
        parts: Vec<BoundArgument<'a>>,
    ) -> Result<Self, ConfigError> {
        let (mut descriptors, bindings): (Vec<_>, Vec<_>) = parts.into_iter().unzip();

        for (id, descriptor) in descriptors.iter().enumerate() {
            validate_descriptor(descriptor, mode)?;

            if let Some(text) = &descriptor.default_text {
                bindings[id].check_convert(text).map_err(|error| {
                    ConfigError(format!(
                        "The default '{text}' for the parameter '{n}' does not convert: {error}.",
                        n = descriptor.name
                    ))
                })?;
            }
        }

        let positionals = resolve_positions(&mut descriptors)?;
        let names = NameTable::new(&descriptors, mode, prefix_aliases)?;

        Ok(Self {
            mode,
            duplicates,
            descriptors,
            bindings,
            names,
            positionals,
        })
    }

    pub(crate) fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    /// Run one parse pass.
    ///
    /// Transient state from any prior pass is discarded up front, so an engine may be
    /// driven repeatedly; a single pass must never run concurrently.
    pub(crate) fn parse(
        &mut self,
        tokens: &[&str],
        messages: &dyn Messages,
    ) -> Result<Outcome, (usize, ParseError)> {
        for binding in self.bindings.iter_mut() {
            binding.reset();
        }

        let mut session = ParseSession::new(self.descriptors.len());
        let offsets: Vec<usize> = tokens
            .iter()
            .scan(0usize, |length, token| {
                let offset = *length;
                *length += token.len();
                Some(offset)
            })
            .collect();
        let end: usize = tokens.iter().map(|token| token.len()).sum();

        let mut cursor = 0;
        let mut index = 0;
        let mut canceled_by: Option<String> = None;
        let mut remaining: Vec<String> = Vec::default();

        while index < tokens.len() {
            let token = tokens[index];
            let offset = offsets[index];

            let triggered = match classify(token, self.mode) {
                TokenKind::Value(value) => {
                    let id = match self.positionals.get(cursor) {
                        Some(&id) => id,
                        None => {
                            return Err((
                                offset,
                                ParseError::categorized(
                                    messages,
                                    ErrorCategory::TooManyArguments,
                                    None,
                                    Some(value),
                                    None,
                                ),
                            ));
                        }
                    };
                    let used = self.descriptors[id].name.clone();
                    let cancel = self.set_one(id, Some(value), &used, offset, &mut session, messages)?;

                    // A bounded positional flips to the next one once full.
                    if let Some(upper) = Bound::from(self.descriptors[id].nargs).upper() {
                        if session.state(id).occurrences >= upper as usize {
                            cursor += 1;
                        }
                    }

                    trigger(id, cancel)
                }
                TokenKind::Long { name, attached } => {
                    let id = self.resolve_long(name, offset, messages)?;
                    let used = self.prefixed(name);
                    let cancel = self.drive_named(
                        id,
                        &used,
                        attached,
                        offset,
                        tokens,
                        &offsets,
                        &mut index,
                        &mut session,
                        messages,
                    )?;
                    trigger(id, cancel)
                }
                TokenKind::Shorts { cluster, attached } => self.drive_shorts(
                    cluster,
                    attached,
                    offset,
                    tokens,
                    &offsets,
                    &mut index,
                    &mut session,
                    messages,
                )?,
            };

            if let Some((id, cancel)) = triggered {
                let name = self.descriptors[id].name.clone();

                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Parameter '{name}' cancelled the parse: {cancel:?}.");
                }

                match cancel {
                    CancelMode::Abort => {
                        return Ok(Outcome::canceled(
                            false,
                            name,
                            std::mem::take(&mut session.warnings),
                        ));
                    }
                    CancelMode::AbortWithHelp => {
                        return Ok(Outcome::canceled(
                            true,
                            name,
                            std::mem::take(&mut session.warnings),
                        ));
                    }
                    CancelMode::Success => {
                        remaining = tokens[index + 1..].iter().map(|t| t.to_string()).collect();
                        canceled_by = Some(name);
                        break;
                    }
                    CancelMode::None => {
                        unreachable!("internal error - a triggered cancellation cannot be None")
                    }
                }
            }

            index += 1;
        }

        // A partially fed positional must have reached its lower bound.
        for &id in &self.positionals {
            let occurrences = session.state(id).occurrences;
            let lower = Bound::from(self.descriptors[id].nargs).lower() as usize;

            if occurrences > 0 && occurrences < lower {
                return Err((
                    end,
                    ParseError::categorized(
                        messages,
                        ErrorCategory::MissingNamedArgumentValue,
                        Some(self.display_name(id)),
                        None,
                        None,
                    ),
                ));
            }
        }

        // After-parsing validation runs for every descriptor, supplied or not; a
        // keep-results cancellation does not waive it.
        for id in 0..self.descriptors.len() {
            let descriptor = &self.descriptors[id];

            if descriptor.required && !session.state(id).has_value {
                return Err((
                    end,
                    ParseError::categorized(
                        messages,
                        ErrorCategory::MissingRequiredArgument,
                        Some(self.display_name(id)),
                        None,
                        None,
                    ),
                ));
            }

            let view = session.view(&self.descriptors);
            self.bindings[id]
                .validate_after_parsing(&view)
                .map_err(|reason| {
                    let display = self.display_name(id);
                    (
                        end,
                        ParseError::with_message(
                            ErrorCategory::ValidationFailed,
                            Some(display.clone()),
                            messages.validation_failed(&display, &reason),
                        ),
                    )
                })?;
        }

        let mode = self.mode;
        let descriptors = &self.descriptors;

        for (id, binding) in self.bindings.iter_mut().enumerate() {
            binding
                .finish(descriptors[id].default_text.as_deref())
                .map_err(|error| {
                    (
                        end,
                        ParseError::categorized(
                            messages,
                            ErrorCategory::ApplyValueError,
                            Some(descriptors[id].display_name(mode)),
                            None,
                            Some(Box::new(error)),
                        ),
                    )
                })?;
        }

        Ok(Outcome::completed(
            canceled_by,
            remaining,
            std::mem::take(&mut session.warnings),
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn drive_named(
        &mut self,
        id: usize,
        used: &str,
        attached: Option<&str>,
        token_offset: usize,
        tokens: &[&str],
        offsets: &[usize],
        index: &mut usize,
        session: &mut ParseSession,
        messages: &dyn Messages,
    ) -> Result<CancelMode, (usize, ParseError)> {
        let bound = Bound::from(self.descriptors[id].nargs);

        #[cfg(feature = "tracing_debug")]
        {
            debug!(
                "Matched '{used}' to the parameter '{n}'.",
                n = self.descriptors[id].name
            );
        }

        match attached {
            Some(value) => {
                if bound.upper() == Some(0) {
                    return Err((
                        token_offset,
                        ParseError::categorized(
                            messages,
                            ErrorCategory::TooManyArguments,
                            Some(self.display_name(id)),
                            Some(value),
                            None,
                        ),
                    ));
                }

                let cancel = self.set_one(id, Some(value), used, token_offset, session, messages)?;

                // The delimited form supplies precisely one value; it cannot satisfy a
                // higher lower bound with follow-up tokens.
                if bound.lower() > 1 {
                    return Err((
                        token_offset,
                        ParseError::categorized(
                            messages,
                            ErrorCategory::MissingNamedArgumentValue,
                            Some(self.display_name(id)),
                            None,
                            None,
                        ),
                    ));
                }

                Ok(cancel)
            }
            None if bound.upper() == Some(0) => {
                self.set_one(id, None, used, token_offset, session, messages)
            }
            None => {
                let mut consumed = 0;

                loop {
                    if let Some(upper) = bound.upper() {
                        if consumed >= upper as usize {
                            break;
                        }
                    }

                    let next = match tokens.get(*index + 1) {
                        Some(next) => *next,
                        None => break,
                    };

                    if !matches!(classify(next, self.mode), TokenKind::Value(_)) {
                        break;
                    }

                    *index += 1;
                    let cancel =
                        self.set_one(id, Some(next), used, offsets[*index], session, messages)?;
                    consumed += 1;

                    if cancel != CancelMode::None {
                        return Ok(cancel);
                    }
                }

                if consumed < bound.lower() as usize {
                    return Err((
                        token_offset,
                        ParseError::categorized(
                            messages,
                            ErrorCategory::MissingNamedArgumentValue,
                            Some(self.display_name(id)),
                            None,
                            None,
                        ),
                    ));
                }

                Ok(CancelMode::None)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn drive_shorts(
        &mut self,
        cluster: &str,
        attached: Option<&str>,
        token_offset: usize,
        tokens: &[&str],
        offsets: &[usize],
        index: &mut usize,
        session: &mut ParseSession,
        messages: &dyn Messages,
    ) -> Result<Option<(usize, CancelMode)>, (usize, ParseError)> {
        let chars: Vec<char> = cluster.chars().collect();

        if let [single] = chars[..] {
            let id = self.resolve_short(single, token_offset, messages)?;
            let cancel = self.drive_named(
                id,
                &format!("-{single}"),
                attached,
                token_offset,
                tokens,
                offsets,
                index,
                session,
                messages,
            )?;

            return Ok(trigger(id, cancel));
        }

        // In a combination, every member must be a switch.
        for single in &chars {
            let id = self.resolve_short(*single, token_offset, messages)?;

            if !self.descriptors[id].is_switch() {
                return Err((
                    token_offset,
                    ParseError::categorized(
                        messages,
                        ErrorCategory::CombinedShortNameNonSwitch,
                        Some(format!("-{single}")),
                        Some(cluster),
                        None,
                    ),
                ));
            }
        }

        if attached.is_some() {
            let last = chars
                .last()
                .expect("internal error - a combination holds at least two shorts");

            return Err((
                token_offset,
                ParseError::categorized(
                    messages,
                    ErrorCategory::TooManyArguments,
                    Some(format!("-{last}")),
                    Some(cluster),
                    None,
                ),
            ));
        }

        for single in chars {
            let id = self
                .names
                .resolve_short(single)
                .expect("internal error - combined short must re-resolve");
            let cancel =
                self.set_one(id, None, &format!("-{single}"), token_offset, session, messages)?;

            if cancel != CancelMode::None {
                return Ok(Some((id, cancel)));
            }
        }

        Ok(None)
    }

    fn set_one(
        &mut self,
        id: usize,
        raw: Option<&str>,
        used: &str,
        offset: usize,
        session: &mut ParseSession,
        messages: &dyn Messages,
    ) -> Result<CancelMode, (usize, ParseError)> {
        let outcome = self.bindings[id]
            .set_value(raw)
            .map_err(|error| (offset, self.field_error(id, error, raw, messages)))?;
        session.record(id, used.to_string());

        // Single-value repetition follows the parser-wide policy; a dictionary's
        // duplicate keys are governed by the binding itself.
        if outcome.duplicate && self.descriptors[id].arity == Arity::Single {
            match self.duplicates {
                DuplicatePolicy::Reject => {
                    return Err((
                        offset,
                        ParseError::categorized(
                            messages,
                            ErrorCategory::DuplicateArgument,
                            Some(self.display_name(id)),
                            raw,
                            None,
                        ),
                    ));
                }
                DuplicatePolicy::Warn => {
                    session
                        .warnings
                        .push(messages.duplicate_warning(&self.display_name(id)));
                }
                DuplicatePolicy::Replace => {
                    // Last write wins, silently.
                }
            }
        }

        Ok(outcome.cancel)
    }

    fn field_error(
        &self,
        id: usize,
        error: FieldError,
        raw: Option<&str>,
        messages: &dyn Messages,
    ) -> ParseError {
        let display = self.display_name(id);

        match error {
            FieldError::Rule(reason) => ParseError::with_message(
                ErrorCategory::ValidationFailed,
                Some(display.clone()),
                messages.validation_failed(&display, &reason),
            ),
            FieldError::InvalidConversion {
                token,
                type_name,
                detail,
            } => {
                let value = token.clone();
                let source = FieldError::InvalidConversion {
                    token,
                    type_name,
                    detail,
                };
                ParseError::categorized(
                    messages,
                    ErrorCategory::ArgumentValueConversion,
                    Some(display),
                    Some(&value),
                    Some(Box::new(source)),
                )
            }
            FieldError::MissingSeparator { token, separator } => {
                let value = token.clone();
                let source = FieldError::MissingSeparator { token, separator };
                ParseError::categorized(
                    messages,
                    ErrorCategory::MissingKeyValuePairSeparator,
                    Some(display),
                    Some(&value),
                    Some(Box::new(source)),
                )
            }
            FieldError::NullValue => ParseError::categorized(
                messages,
                ErrorCategory::NullArgumentValue,
                Some(display),
                raw,
                None,
            ),
            error @ FieldError::DuplicateKey { .. } => ParseError::categorized(
                messages,
                ErrorCategory::InvalidDictionaryValue,
                Some(display),
                raw,
                Some(Box::new(error)),
            ),
            error @ FieldError::Callback(_) => ParseError::categorized(
                messages,
                ErrorCategory::ApplyValueError,
                Some(display),
                raw,
                Some(Box::new(error)),
            ),
        }
    }

    fn resolve_long(
        &self,
        name: &str,
        offset: usize,
        messages: &dyn Messages,
    ) -> Result<usize, (usize, ParseError)> {
        match self.names.resolve_long(name) {
            LongResolution::Matched(id) => Ok(id),
            LongResolution::Ambiguous(candidates) => {
                let prefix = self.prefixed(name);
                let candidates: Vec<String> =
                    candidates.iter().map(|c| self.prefixed(c)).collect();
                Err((
                    offset,
                    ParseError::with_message(
                        ErrorCategory::AmbiguousPrefixAlias,
                        Some(prefix.clone()),
                        messages.ambiguous_prefix(&prefix, &candidates),
                    ),
                ))
            }
            LongResolution::Unknown => Err((
                offset,
                ParseError::categorized(
                    messages,
                    ErrorCategory::UnknownArgument,
                    Some(self.prefixed(name)),
                    None,
                    None,
                ),
            )),
        }
    }

    fn resolve_short(
        &self,
        short: char,
        offset: usize,
        messages: &dyn Messages,
    ) -> Result<usize, (usize, ParseError)> {
        self.names.resolve_short(short).ok_or_else(|| {
            (
                offset,
                ParseError::categorized(
                    messages,
                    ErrorCategory::UnknownArgument,
                    Some(format!("-{short}")),
                    None,
                    None,
                ),
            )
        })
    }

    fn display_name(&self, id: usize) -> String {
        self.descriptors[id].display_name(self.mode)
    }

    fn prefixed(&self, name: &str) -> String {
        match self.mode {
            ParsingMode::SingleDash => format!("-{name}"),
            ParsingMode::LongShort => format!("--{name}"),
        }
    }
}

fn trigger(id: usize, cancel: CancelMode) -> Option<(usize, CancelMode)> {
    if cancel == CancelMode::None {
        None
    } else {
        Some((id, cancel))
    }
}

fn validate_descriptor(descriptor: &Descriptor, mode: ParsingMode) -> Result<(), ConfigError> {
    let name = &descriptor.name;

    if name.is_empty() {
        return Err(ConfigError("Cannot use an empty parameter name.".to_string()));
    }

    if descriptor.aliases.iter().any(|alias| alias.is_empty()) {
        return Err(ConfigError(format!(
            "Cannot use an empty alias on the parameter '{name}'."
        )));
    }

    if descriptor.hidden && descriptor.required {
        return Err(ConfigError(format!(
            "The hidden parameter '{name}' cannot be required."
        )));
    }

    if descriptor.hidden && descriptor.positional {
        return Err(ConfigError(format!(
            "The hidden parameter '{name}' cannot be positional."
        )));
    }

    if descriptor.default_text.is_some() {
        if descriptor.required {
            return Err(ConfigError(format!(
                "The required parameter '{name}' cannot carry a default."
            )));
        }

        if descriptor.arity != Arity::Single || descriptor.nargs == Nargs::Precisely(0) {
            return Err(ConfigError(format!(
                "Only single-value parameters accept a default; '{name}' does not."
            )));
        }
    }

    if descriptor.separator.is_some()
        && matches!(descriptor.arity, Arity::Single | Arity::Method)
    {
        return Err(ConfigError(format!(
            "Only repeatable parameters accept a separator; '{name}' does not."
        )));
    }

    if descriptor.positional && descriptor.nargs == Nargs::Precisely(0) {
        return Err(ConfigError(format!(
            "The positional parameter '{name}' must accept values."
        )));
    }

    if descriptor.long_suppressed {
        let usable_short = matches!(mode, ParsingMode::LongShort)
            && (descriptor.short.is_some() || !descriptor.short_aliases.is_empty());

        if !usable_short {
            return Err(ConfigError(format!(
                "The parameter '{name}' has neither a usable long nor short name."
            )));
        }
    }

    Ok(())
}

fn resolve_positions(descriptors: &mut [Descriptor]) -> Result<Vec<usize>, ConfigError> {
    let mut explicit: Vec<(usize, usize)> = Vec::default();
    let mut implicit: Vec<usize> = Vec::default();

    for (id, descriptor) in descriptors.iter().enumerate() {
        if !descriptor.positional {
            if descriptor.position.is_some() {
                return Err(ConfigError(format!(
                    "The option '{n}' cannot take a position.",
                    n = descriptor.name
                )));
            }

            continue;
        }

        match descriptor.position {
            Some(position) => explicit.push((position, id)),
            None => implicit.push(id),
        }
    }

    explicit.sort_by_key(|(position, _)| *position);

    for window in explicit.windows(2) {
        if window[0].0 == window[1].0 {
            return Err(ConfigError(format!(
                "Cannot repeat the position {p}.",
                p = window[0].0
            )));
        }
    }

    let positionals: Vec<usize> = explicit
        .into_iter()
        .map(|(_, id)| id)
        .chain(implicit)
        .collect();

    for (index, &id) in positionals.iter().enumerate() {
        descriptors[id].position = Some(index);
    }

    let mut seen_optional: Option<&str> = None;
    let mut seen_unbounded: Option<&str> = None;

    for &id in &positionals {
        let descriptor = &descriptors[id];

        if let Some(unbounded) = seen_unbounded {
            return Err(ConfigError(format!(
                "The positional parameter '{n}' cannot follow the unbounded '{unbounded}'.",
                n = descriptor.name
            )));
        }

        if descriptor.required {
            if let Some(optional) = seen_optional {
                return Err(ConfigError(format!(
                    "The required positional parameter '{n}' cannot follow the optional '{optional}'.",
                    n = descriptor.name
                )));
            }
        } else {
            seen_optional.get_or_insert(&descriptor.name);
        }

        if Bound::from(descriptor.nargs).upper().is_none() {
            seen_unbounded = Some(&descriptor.name);
        }
    }

    Ok(positionals)
}
