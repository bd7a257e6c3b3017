/* Contract handles and the declare-and-deploy factory */

use crate::errors::ResponseError;
use crate::parser::{ParserOptions, ResponseParser};
use crate::value::DecodedOutputs;
use starknet_abi_types::{Abi, AbiEnums, AbiStructs, CompiledContract};
use thiserror::Error;
use tracing::{debug, info};

/// Error type returned by external collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum ContractError {
    #[error("function '{name}' is not declared in the contract ABI")]
    UnknownFunction { name: String },

    #[error("failed to decode the response of '{function}': {source}")]
    Response {
        function: String,
        #[source]
        source: ResponseError,
    },
}

#[derive(Debug, Error)]
pub enum DeployError {
    /// The declare-and-deploy submission itself failed.
    #[error("declare-and-deploy failed: {0}")]
    Submit(#[source] BoxError),

    /// The submission succeeded but returned no contract address.
    #[error("deployment of the contract failed: no contract address returned")]
    MissingAddress,
}

/* A deployed contract: ABI, address and the account used to talk to it */
#[derive(Debug, Clone)]
pub struct Contract<A> {
    abi: Abi,
    structs: AbiStructs,
    enums: AbiEnums,
    address: String,
    account: A,
    /* Class of this instance, when the factory knows it */
    pub class_hash: Option<String>,
    /* Set when the handle came out of `ContractFactory::deploy` */
    pub deploy_transaction_hash: Option<String>,
}

impl<A> Contract<A> {
    pub fn new(abi: Abi, address: impl Into<String>, account: A) -> Self {
        let structs = abi.structs();
        let enums = abi.enums();
        Self {
            abi,
            structs,
            enums,
            address: address.into(),
            account,
            class_hash: None,
            deploy_transaction_hash: None,
        }
    }

    pub fn abi(&self) -> &Abi {
        &self.abi
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn account(&self) -> &A {
        &self.account
    }

    /* Swap the account used by this handle */
    pub fn connect(&mut self, account: A) {
        self.account = account;
    }

    /* Parser over this contract's struct and enum tables */
    pub fn response_parser(&self, options: ParserOptions) -> ResponseParser<'_> {
        ResponseParser::with_options(&self.structs, &self.enums, options)
    }

    /* Decode the raw response of `method` with default options */
    pub fn parse_response<S: AsRef<str>>(
        &self,
        method: &str,
        tokens: &[S],
    ) -> Result<DecodedOutputs, ContractError> {
        self.parse_response_with(ParserOptions::default(), method, tokens)
    }

    pub fn parse_response_with<S: AsRef<str>>(
        &self,
        options: ParserOptions,
        method: &str,
        tokens: &[S],
    ) -> Result<DecodedOutputs, ContractError> {
        let function = self
            .abi
            .function(method)
            .ok_or_else(|| ContractError::UnknownFunction {
                name: method.to_string(),
            })?;
        debug!(
            contract = %self.address,
            method,
            outputs = function.outputs.len(),
            tokens = tokens.len(),
            "parsing call response"
        );
        self.response_parser(options)
            .parse_outputs(&function.outputs, tokens)
            .map_err(|source| ContractError::Response {
                function: method.to_string(),
                source,
            })
    }
}

/// Everything the external declare-and-deploy operation needs.
#[derive(Debug, Clone)]
pub struct DeclareDeployRequest<'a> {
    pub contract: &'a CompiledContract,
    pub casm: Option<&'a serde_json::Value>,
    pub class_hash: Option<&'a str>,
    pub compiled_class_hash: Option<&'a str>,
    pub constructor_calldata: &'a [String],
    pub salt: Option<&'a str>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclareDeployResponse {
    /* Class hash of the declared (or already declared) class */
    pub class_hash: Option<String>,
    pub contract_address: Option<String>,
    pub transaction_hash: String,
}

/// External collaborator that declares a class if needed and deploys an instance.
pub trait Deployer {
    fn declare_and_deploy(
        &self,
        request: DeclareDeployRequest<'_>,
    ) -> Result<DeclareDeployResponse, BoxError>;
}

#[derive(Debug, Clone, Default)]
pub struct ContractOptions {
    pub address_salt: Option<String>,
}

/* Construction parameters for `ContractFactory` */
#[derive(Debug, Clone)]
pub struct ContractFactoryParams<A> {
    pub compiled_contract: CompiledContract,
    pub account: A,
    pub casm: Option<serde_json::Value>,
    pub class_hash: Option<String>,
    pub compiled_class_hash: Option<String>,
    /* Overrides the ABI embedded in the compiled contract */
    pub abi: Option<Abi>,
    pub contract_options: ContractOptions,
}

impl<A> ContractFactoryParams<A> {
    pub fn new(compiled_contract: CompiledContract, account: A) -> Self {
        Self {
            compiled_contract,
            account,
            casm: None,
            class_hash: None,
            compiled_class_hash: None,
            abi: None,
            contract_options: ContractOptions::default(),
        }
    }
}

/* Deploys compiled contracts and hands back `Contract` handles */
#[derive(Debug, Clone)]
pub struct ContractFactory<A> {
    compiled_contract: CompiledContract,
    account: A,
    abi: Abi,
    casm: Option<serde_json::Value>,
    class_hash: Option<String>,
    compiled_class_hash: Option<String>,
    contract_options: ContractOptions,
}

impl<A: Deployer + Clone> ContractFactory<A> {
    pub fn new(params: ContractFactoryParams<A>) -> Self {
        let abi = params
            .abi
            .unwrap_or_else(|| params.compiled_contract.abi.clone());
        Self {
            compiled_contract: params.compiled_contract,
            account: params.account,
            abi,
            casm: params.casm,
            class_hash: params.class_hash,
            compiled_class_hash: params.compiled_class_hash,
            contract_options: params.contract_options,
        }
    }

    pub fn abi(&self) -> &Abi {
        &self.abi
    }

    pub fn account(&self) -> &A {
        &self.account
    }

    /* Declare the class if needed, deploy it with already-encoded constructor calldata
     * and return a handle on the new instance. */
    pub fn deploy(&self, constructor_calldata: &[String]) -> Result<Contract<A>, DeployError> {
        debug!(
            calldata = constructor_calldata.len(),
            class_hash = ?self.class_hash,
            "submitting declare-and-deploy"
        );
        let response = self
            .account
            .declare_and_deploy(DeclareDeployRequest {
                contract: &self.compiled_contract,
                casm: self.casm.as_ref(),
                class_hash: self.class_hash.as_deref(),
                compiled_class_hash: self.compiled_class_hash.as_deref(),
                constructor_calldata,
                salt: self.contract_options.address_salt.as_deref(),
            })
            .map_err(DeployError::Submit)?;

        let address = response
            .contract_address
            .filter(|address| !address.is_empty())
            .ok_or(DeployError::MissingAddress)?;
        info!(
            contract = %address,
            class_hash = ?response.class_hash,
            transaction = %response.transaction_hash,
            "contract deployed"
        );

        let mut contract = Contract::new(self.abi.clone(), address, self.account.clone());
        /* A declare that ran in this call reports the hash; otherwise keep the configured one */
        contract.class_hash = response.class_hash.or_else(|| self.class_hash.clone());
        contract.deploy_transaction_hash = Some(response.transaction_hash);
        Ok(contract)
    }

    /* Use a different account for subsequent deployments */
    pub fn connect(mut self, account: A) -> Self {
        self.account = account;
        self
    }

    /* Handle on an existing instance of this class */
    pub fn attach(&self, address: impl Into<String>) -> Contract<A> {
        let mut contract = Contract::new(self.abi.clone(), address, self.account.clone());
        contract.class_hash = self.class_hash.clone();
        contract
    }
}
