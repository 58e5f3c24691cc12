use chrono::Utc;
use tracing::{debug, info};

use super::super::domain::{
    Animal, Applicant, Contract, ContractId, ContractQuery, ContractRequest, ContractView,
};
use super::super::identity::IdentityContext;
use super::super::policy::{AccessContext, Operation};
use super::super::store::{EntityKind, EntityStore, StoreError};
use super::{views, AdoptionWorkflow, WorkflowError};

const KIND: EntityKind = EntityKind::Contract;

impl<S> AdoptionWorkflow<S>
where
    S: EntityStore + 'static,
{
    pub fn issue_contract(
        &self,
        actor: Option<&IdentityContext>,
        request: ContractRequest,
    ) -> Result<ContractView, WorkflowError> {
        self.precheck(actor, KIND, Operation::Create)?;
        let view = self.store.transaction(|tx| {
            tx.require::<Applicant>(&request.applicant_id)?;
            tx.require::<Animal>(&request.animal_id)?;
            let contract = Contract {
                id: ContractId(tx.next_serial(KIND)?),
                applicant_id: request.applicant_id,
                animal_id: request.animal_id.clone(),
                payment_proof: request.payment_proof.clone(),
                signature: request.signature.clone(),
                created_at: Utc::now(),
            };
            let contract = tx.insert(contract)?;
            Ok::<_, WorkflowError>(views::contract_view(&*tx, contract)?)
        })?;

        info!(
            contract = %view.contract.id,
            applicant = %view.contract.applicant_id,
            animal = %view.contract.animal_id,
            signed = view.contract.is_signed(),
            "contract issued"
        );
        Ok(view)
    }

    pub fn get_contract(
        &self,
        actor: Option<&IdentityContext>,
        id: ContractId,
    ) -> Result<ContractView, WorkflowError> {
        self.precheck(actor, KIND, Operation::View)?;
        self.store.read(|tx| {
            let contract = tx.require::<Contract>(&id)?;
            self.authorize(
                actor,
                KIND,
                Operation::View,
                AccessContext::for_applicant(contract.applicant_id),
            )?;
            Ok::<_, WorkflowError>(views::contract_view(tx, contract)?)
        })
    }

    pub fn list_contracts(
        &self,
        actor: Option<&IdentityContext>,
        query: ContractQuery,
    ) -> Result<Vec<ContractView>, WorkflowError> {
        self.precheck(actor, KIND, Operation::List)?;
        let Some(filter) = self.scoped(actor, KIND, query.into())? else {
            return Ok(Vec::new());
        };
        let contracts = self.store.read(|tx| {
            tx.list::<Contract>(&filter)?
                .into_iter()
                .map(|contract| views::contract_view(tx, contract))
                .collect::<Result<Vec<_>, StoreError>>()
                .map_err(WorkflowError::from)
        })?;
        debug!(count = contracts.len(), "listed contracts");
        Ok(contracts)
    }

    /// Stores the signature token. The owning applicant or an admin may sign.
    pub fn sign_contract(
        &self,
        actor: Option<&IdentityContext>,
        id: ContractId,
        signature: String,
    ) -> Result<ContractView, WorkflowError> {
        self.precheck(actor, KIND, Operation::Sign)?;
        let view = self.store.transaction(|tx| {
            let mut contract = tx.require::<Contract>(&id)?;
            self.authorize(
                actor,
                KIND,
                Operation::Sign,
                AccessContext::for_applicant(contract.applicant_id),
            )?;
            contract.signature = Some(signature.clone());
            let contract = tx.replace(contract)?;
            Ok::<_, WorkflowError>(views::contract_view(&*tx, contract)?)
        })?;

        info!(contract = %id, "contract signed");
        Ok(view)
    }

    pub fn delete_contract(
        &self,
        actor: Option<&IdentityContext>,
        id: ContractId,
    ) -> Result<Contract, WorkflowError> {
        self.precheck(actor, KIND, Operation::Delete)?;
        let removed = self
            .store
            .transaction(|tx| tx.remove::<Contract>(&id).map_err(WorkflowError::from))?;
        info!(contract = %id, "contract deleted");
        Ok(removed)
    }
}
