//! solidity bindings for the two contracts the panel calls

use alloy::sol;

sol! {
    /// pre-deployed escrow; `pullFunds` is restricted to the company wallet
    #[sol(rpc)]
    interface IEscrow {
        function pullFunds(address token, address user, address recipient, uint256 amount) external;
        function companyWallet() external view returns (address);
    }
}

sol! {
    /// the subset of bep-20 the panel reads
    #[sol(rpc)]
    interface IBep20 {
        function balanceOf(address owner) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function decimals() external view returns (uint8);
    }
}
