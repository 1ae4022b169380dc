use std::collections::HashMap;
use std::str::FromStr;

use clap::{Args as ArgsTrait, Parser, Subcommand};

use backprop::gradient_check::DEFAULT_EPSILON;
use backprop::NetworkConfig;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compares the analytic gradient of a random network against finite differences.
    Check(CheckConfig),
    /// Evaluates the cost and gradient of a random network once.
    Evaluate(EvaluateConfig),
}

#[derive(ArgsTrait, Clone, Debug)]
pub struct CheckConfig {
    #[command(flatten)]
    pub setup: Setup,

    /// The step used for the centered finite differences.
    #[arg(long, default_value_t = DEFAULT_EPSILON)]
    pub epsilon: f64,

    /// The largest relative error accepted between the analytic and numerical gradients.
    #[arg(long, default_value_t = 1e-4)]
    pub tolerance: f64,
}

#[derive(ArgsTrait, Clone, Debug)]
pub struct EvaluateConfig {
    #[command(flatten)]
    pub setup: Setup,
}

#[derive(ArgsTrait, Clone, Debug)]
pub struct Setup {
    /// Network options.
    ///
    /// Parameters:
    ///   preset=string - The architecture. (shallow or deep)
    ///   inputs=int    - The number of input features.
    ///   hidden=list   - Hidden layer sizes for the deep preset, separated by ':'. (3 sizes)
    ///   classes=int   - The number of output classes.
    #[arg(
        short,
        long,
        default_value = "preset=deep,inputs=8,hidden=6:5:4,classes=3",
        verbatim_doc_comment
    )]
    pub network: NetworkPreset,

    /// A JSON file describing the network. Overrides `network`.
    #[arg(short, long, verbatim_doc_comment)]
    pub config: Option<String>,

    /// Batch options.
    ///
    /// Parameters:
    ///   samples=int - The number of samples in the random batch.
    ///   seed=int    - The seed for the parameters and the batch.
    #[arg(short, long, default_value = "samples=10,seed=0", verbatim_doc_comment)]
    pub batch: Batch,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkPreset(pub NetworkConfig);

impl FromStr for NetworkPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields = parse_map(s)?;

        let inputs = parse_field(&fields, "inputs")?.unwrap_or(8);
        let classes = parse_field(&fields, "classes")?.unwrap_or(3);

        match fields.get("preset").copied().unwrap_or("deep") {
            "shallow" => {
                if fields.contains_key("hidden") {
                    return Err("the shallow preset has no hidden layers".to_owned());
                }
                Ok(Self(NetworkConfig::shallow(inputs, classes)))
            }
            "deep" => {
                let hidden = fields
                    .get("hidden")
                    .map(|&f| parse_sizes(f))
                    .transpose()?
                    .unwrap_or_else(|| vec![6, 5, 4]);

                let hidden: [usize; 3] = hidden.try_into().map_err(|h: Vec<usize>| {
                    format!("expected 3 hidden sizes, found {}", h.len())
                })?;

                Ok(Self(NetworkConfig::deep(inputs, hidden, classes)))
            }
            unknown => Err(format!("unknown preset: {unknown}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Batch {
    pub samples: usize,
    pub seed: u64,
}

impl FromStr for Batch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields = parse_map(s)?;

        let samples = parse_field(&fields, "samples")?.unwrap_or(10);
        if samples == 0 {
            return Err("samples must be at least 1".to_owned());
        }

        let seed = parse_field(&fields, "seed")?.unwrap_or(0);

        Ok(Self { samples, seed })
    }
}

fn parse_field<T: FromStr>(fields: &HashMap<&str, &str>, key: &str) -> Result<Option<T>, String> {
    fields
        .get(key)
        .map(|&f| {
            f.parse::<T>()
                .map_err(|_| format!("invalid value for {key}: {f}"))
        })
        .transpose()
}

fn parse_sizes(string: &str) -> Result<Vec<usize>, String> {
    string
        .split(':')
        .map(|size| {
            size.trim()
                .parse::<usize>()
                .map_err(|_| format!("invalid layer size: {size}"))
        })
        .collect()
}

fn parse_map(string: &str) -> Result<HashMap<&str, &str>, String> {
    string
        .split(',')
        .map(|field| field.trim())
        .map(|field| field.split('=').map(|part| part.trim()))
        .map(|mut field_part| {
            let key = field_part
                .next()
                .ok_or_else(|| "no key for field".to_owned())?;
            let value = field_part
                .next()
                .ok_or_else(|| format!("no value for key: {key}"))?;
            Ok((key, value))
        })
        .collect()
}
