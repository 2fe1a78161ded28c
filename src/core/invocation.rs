/// What the command line asks for. Anything other than no arguments or a
/// lone `check` is a command line for another tool and is kept verbatim, so
/// its flags are never interpreted here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    ListCatalog,
    Check,
    Rewrite(Vec<String>),
}

impl Invocation {
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let args: Vec<String> = args.into_iter().collect();
        match args.first().map(String::as_str) {
            None => Invocation::ListCatalog,
            Some("check") => Invocation::Check,
            Some(_) => Invocation::Rewrite(args),
        }
    }
}
